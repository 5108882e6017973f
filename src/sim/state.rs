//! Runtime simulation state: the root aggregate and its pieces
//!
//! `SimulationState` is exclusively owned by the game session; components
//! receive a mutable reference per call and never hold copies.

use std::collections::VecDeque;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::MaterialCost;
use crate::core::types::DiscoveryId;

/// One line in the bounded event history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    pub time: String,
    pub message: String,
    pub timestamp: i64,
}

impl EventEntry {
    pub fn now(message: impl Into<String>) -> Self {
        let at = Utc::now();
        Self {
            time: at.format("%H:%M:%S").to_string(),
            message: message.into(),
            timestamp: at.timestamp_millis(),
        }
    }
}

/// Bounded event history, newest first
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventEntry>,
    cap: usize,
}

impl EventLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Rebuild from persisted entries, truncating to capacity (newest kept)
    pub fn from_entries(cap: usize, entries: Vec<EventEntry>) -> Self {
        let mut log = Self::new(cap);
        for entry in entries.into_iter().take(cap) {
            log.entries.push_back(entry);
        }
        log
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.entries.push_front(EventEntry::now(message));
        while self.entries.len() > self.cap {
            self.entries.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &EventEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<EventEntry> {
        self.entries.iter().cloned().collect()
    }
}

/// Per-resource balances. Quantities never go negative; multi-cost debits
/// are atomic (validated in full before any mutation).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceLedger {
    amounts: AHashMap<String, u64>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, id: &str) -> u64 {
        self.amounts.get(id).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, id: &str, amount: u64) {
        *self.amounts.entry(id.to_string()).or_insert(0) += amount;
    }

    pub fn set(&mut self, id: &str, amount: u64) {
        self.amounts.insert(id.to_string(), amount);
    }

    /// True when every cost in the list is covered
    pub fn has_all(&self, costs: &[MaterialCost]) -> bool {
        costs.iter().all(|c| self.balance(&c.id) >= c.amount)
    }

    /// Deduct the full cost list, or nothing at all. Returns false (with no
    /// mutation) when any single cost is uncovered.
    pub fn debit_all(&mut self, costs: &[MaterialCost]) -> bool {
        if !self.has_all(costs) {
            return false;
        }
        for c in costs {
            if let Some(balance) = self.amounts.get_mut(&c.id) {
                *balance -= c.amount;
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.amounts.iter().map(|(id, &amount)| (id.as_str(), amount))
    }
}

/// A discovery currently visible on the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct LiveDiscovery {
    pub id: DiscoveryId,
    /// Index into the catalog's discovery type list
    pub type_index: usize,
    /// Horizon position hint in percent of width; presentation only
    pub position: f32,
    pub spawned_at_ms: u64,
    pub expires_at_ms: u64,
}

/// A module occupying one hull slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledModule {
    pub module_id: String,
    pub slot: usize,
    pub installed_at: DateTime<Utc>,
    /// Costs actually paid at install time. Authoritative for the sell
    /// refund even if the catalog's prices change later.
    pub paid_costs: Vec<MaterialCost>,
}

/// The root simulation aggregate
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Total distance drifted, the sole travel currency
    pub distance: u64,
    pub is_sailing: bool,
    /// Index into the catalog's vessel tier list
    pub current_vessel: usize,
    pub resources: ResourceLedger,
    pub discoveries: Vec<LiveDiscovery>,
    pub next_discovery_id: u64,
    pub installed: Vec<InstalledModule>,
    /// Thresholds already announced; monotonic, never removed
    pub reached_milestones: Vec<u64>,
    pub events: EventLog,
}

impl SimulationState {
    pub fn new(max_event_history: usize) -> Self {
        Self {
            distance: 0,
            is_sailing: true,
            current_vessel: 0,
            resources: ResourceLedger::new(),
            discoveries: Vec::new(),
            next_discovery_id: 0,
            installed: Vec::new(),
            reached_milestones: Vec::new(),
            events: EventLog::new(max_event_history),
        }
    }

    pub fn allocate_discovery_id(&mut self) -> DiscoveryId {
        let id = DiscoveryId(self.next_discovery_id);
        self.next_discovery_id += 1;
        id
    }

    pub fn discovery(&self, id: DiscoveryId) -> Option<&LiveDiscovery> {
        self.discoveries.iter().find(|d| d.id == id)
    }

    /// Remove and return a live discovery by id; None when already gone
    pub fn take_discovery(&mut self, id: DiscoveryId) -> Option<LiveDiscovery> {
        let index = self.discoveries.iter().position(|d| d.id == id)?;
        Some(self.discoveries.remove(index))
    }

    pub fn module_in_slot(&self, slot: usize) -> Option<&InstalledModule> {
        self.installed.iter().find(|m| m.slot == slot)
    }
}
