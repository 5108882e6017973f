//! Simulation configuration with documented constants
//!
//! All timing and progression constants are collected here with explanations
//! of their purpose and how they interact with each other.

use crate::core::types::Millis;

/// Configuration for the drift simulation
///
/// These values are tuned for a relaxed idle pace. Changing them shifts how
/// often the player has something to react to.
#[derive(Debug, Clone)]
pub struct SimConfig {
    // === PROGRESSION ===
    /// Milliseconds between drift ticks
    ///
    /// Each tick credits the current vessel's drift speed to total distance.
    /// At the default (2000ms) the starting raft gains 1 distance every
    /// two seconds.
    pub drift_interval_ms: Millis,

    /// Auto-save every time total distance crosses a multiple of this
    ///
    /// Checked with an integer-division boundary test so drift speeds
    /// greater than 1 cannot step over a multiple without triggering it.
    pub save_interval: u64,

    /// Distance at which the journey progress readout pegs at 100%
    ///
    /// The readout is log-scaled, so early progress is visible long before
    /// this value is approached.
    pub max_distance: u64,

    /// Ascending distance thresholds that trigger a one-time notification
    ///
    /// Once reached, a milestone is never announced again, even across
    /// save/load.
    pub milestones: Vec<u64>,

    // === DISCOVERIES ===
    /// Minimum delay between discovery spawns (ms)
    pub discovery_min_interval_ms: Millis,

    /// Maximum delay between discovery spawns (ms)
    ///
    /// The actual delay is re-drawn uniformly from [min, max] after every
    /// spawn, so cadence itself is randomized per cycle.
    pub discovery_max_interval_ms: Millis,

    /// How long a spawned discovery waits before expiring unclaimed (ms)
    pub discovery_duration_ms: Millis,

    // === AUTO-COLLECTION ===
    /// Milliseconds between autocollector sweeps
    ///
    /// Deliberately distinct from both the drift tick and the spawn cadence;
    /// each sweep rolls every installed autocollector against every pending
    /// discovery.
    pub autocollect_interval_ms: Millis,

    // === EVENT LOG ===
    /// Maximum entries kept in the event history, oldest evicted first
    pub max_event_history: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            drift_interval_ms: 2000,
            save_interval: 10,
            max_distance: 1_000_000,
            milestones: vec![10, 100, 1000, 10_000, 100_000, 1_000_000],
            discovery_min_interval_ms: 25_000,
            discovery_max_interval_ms: 40_000,
            discovery_duration_ms: 10_000,
            autocollect_interval_ms: 5_000,
            max_event_history: 10,
        }
    }
}
