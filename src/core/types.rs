//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for a live discovery.
///
/// Allocated from a monotonic counter; unique for the lifetime of a session.
/// Expiry callbacks match on this id, never on a position in the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscoveryId(pub u64);

/// Milliseconds of simulation time
pub type Millis = u64;

/// Severity channel for notification collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_id_equality() {
        let a = DiscoveryId(1);
        let b = DiscoveryId(1);
        let c = DiscoveryId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_discovery_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<DiscoveryId, &str> = HashMap::new();
        map.insert(DiscoveryId(7), "driftwood");
        assert_eq!(map.get(&DiscoveryId(7)), Some(&"driftwood"));
    }
}
