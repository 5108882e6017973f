//! Game session: owns the whole simulation and dispatches timer callbacks
//!
//! A session holds the state, catalog, RNG, and timer queue, and routes
//! every fired timer and user call through the component logic. All
//! mutation happens on the caller's thread; each dispatch runs to
//! completion before the next, so no locking is needed anywhere.
//!
//! Presentation collaborators never get called into: the session queues
//! `SessionEvent`s and the caller drains them when ready to render.

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::core::types::{DiscoveryId, Severity};
use crate::persistence::{self, SaveData};
use crate::sim::autocollect::AutoCollector;
use crate::sim::discovery::{DiscoveryScheduler, FoundBy, RewardSummary};
use crate::sim::progression::{self, ProgressionEngine};
use crate::sim::state::SimulationState;
use crate::sim::timers::{Scheduler, TaskKind};
use crate::sim::vessel::{
    self, InstallReceipt, SellReceipt, TransactionDenied, UpgradeReceipt,
};

/// How a discovery left the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Investigated,
    Ignored,
}

/// State-change notification for presentation collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DiscoverySpawned {
        id: DiscoveryId,
        type_name: String,
        color: String,
        /// Horizon position hint in percent of width
        position: f32,
    },
    DiscoveryRemoved {
        id: DiscoveryId,
        outcome: DiscoveryOutcome,
    },
    ResourceChanged {
        id: String,
        amount: u64,
    },
    VesselChanged {
        index: usize,
    },
    MilestoneReached {
        distance: u64,
    },
    Notify {
        message: String,
        severity: Severity,
    },
    /// Fire-and-forget audio cue for a fresh discovery
    DiscoveryCue,
    /// The autosave cadence fired; the caller should persist a snapshot
    AutoSave,
    /// Catch-all redraw request
    Refresh,
}

pub struct GameSession {
    pub state: SimulationState,
    pub catalog: Catalog,
    pub config: SimConfig,
    scheduler: Scheduler,
    rng: ChaCha8Rng,
    progression: ProgressionEngine,
    discovery: DiscoveryScheduler,
    autocollect: AutoCollector,
    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Start a fresh journey. The session begins sailing with all three
    /// timer sources armed.
    pub fn new(catalog: Catalog, config: SimConfig, seed: u64) -> Self {
        let mut session = Self {
            state: SimulationState::new(config.max_event_history),
            catalog,
            config,
            scheduler: Scheduler::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            progression: ProgressionEngine::new(),
            discovery: DiscoveryScheduler::new(),
            autocollect: AutoCollector::new(),
            events: Vec::new(),
        };
        session.state.events.record("Started a new journey");
        session.arm_timers();
        tracing::info!("new session started (seed {seed})");
        session
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// Advance virtual time, dispatching every due timer in order, and
    /// return the notifications produced along the way.
    pub fn advance(&mut self, delta_ms: u64) -> Vec<SessionEvent> {
        let deadline = self.scheduler.now() + delta_ms;
        while let Some((_, kind)) = self.scheduler.pop_due(deadline) {
            match kind {
                TaskKind::DriftTick => self.on_drift_tick(),
                TaskKind::DiscoverySpawn => self.on_discovery_spawn(),
                TaskKind::DiscoveryExpire(id) => self.on_discovery_expire(id),
                TaskKind::AutocollectSweep => self.on_autocollect_sweep(),
            }
        }
        self.drain_events()
    }

    /// Take the queued notifications. `advance` drains implicitly; the
    /// synchronous calls (investigate, purchases, save/load) queue theirs
    /// for the next drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop or weigh anchor. Anchoring cancels all three recurring timer
    /// sources; live discoveries keep their expiry. Resuming re-arms all
    /// three from the current instant, so anchored time adds nothing.
    pub fn set_sailing(&mut self, sailing: bool) {
        if self.state.is_sailing == sailing {
            return;
        }
        self.state.is_sailing = sailing;
        if sailing {
            self.arm_timers();
            self.state.events.record("Resumed the journey");
            self.push_notify("Your ship is drifting with the current.", Severity::Info);
        } else {
            self.disarm_timers();
            self.state.events.record("Dropped anchor");
            self.push_notify("Your ship is anchored.", Severity::Info);
        }
        self.events.push(SessionEvent::Refresh);
    }

    /// Resolve a discovery by hand. Silent no-op (None) when the id is
    /// already gone — expired or raced with the autocollector.
    pub fn investigate(&mut self, id: DiscoveryId) -> Option<RewardSummary> {
        let before = self.state.distance;
        let summary = self.discovery.resolve(
            &mut self.state,
            &self.catalog,
            &mut self.scheduler,
            id,
            FoundBy::Investigation,
        )?;
        self.events.push(SessionEvent::DiscoveryRemoved {
            id,
            outcome: DiscoveryOutcome::Investigated,
        });
        self.push_reward_events(&summary);
        self.settle_distance_gain(before);
        Some(summary)
    }

    /// Advance to the next vessel tier. A successful upgrade while sailing
    /// restarts the drift timer so the new speed applies immediately; only
    /// the timer phase resets, accrued distance is untouched.
    pub fn upgrade_vessel(&mut self) -> std::result::Result<UpgradeReceipt, TransactionDenied> {
        let receipt = vessel::upgrade_vessel(&mut self.state, &self.catalog)?;
        if self.state.is_sailing {
            self.progression.restart(&self.config, &mut self.scheduler);
        }
        self.events.push(SessionEvent::VesselChanged {
            index: self.state.current_vessel,
        });
        let message = receipt
            .message
            .clone()
            .unwrap_or_else(|| format!("You've upgraded to {}!", receipt.to));
        self.push_notify(message, Severity::Success);
        self.events.push(SessionEvent::Refresh);
        Ok(receipt)
    }

    pub fn install_module(
        &mut self,
        module_id: &str,
        slot: usize,
    ) -> std::result::Result<InstallReceipt, TransactionDenied> {
        let receipt =
            vessel::install_module(&mut self.state, &self.catalog, Utc::now(), module_id, slot)?;
        self.push_notify(
            format!("{} installed in slot {}.", receipt.module_name, receipt.slot),
            Severity::Success,
        );
        self.events.push(SessionEvent::Refresh);
        Ok(receipt)
    }

    pub fn sell_module(
        &mut self,
        slot: usize,
    ) -> std::result::Result<SellReceipt, TransactionDenied> {
        let receipt = vessel::sell_module(&mut self.state, &self.catalog, slot)?;
        let mut message = format!(
            "Sold {} for {} nautical miles",
            receipt.module_name, receipt.distance_refund
        );
        for refund in &receipt.material_refunds {
            let name = self
                .catalog
                .resource(&refund.id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| refund.id.clone());
            message.push_str(&format!(", +{} {}", refund.amount, name));
        }
        self.push_notify(message, Severity::Success);
        self.events.push(SessionEvent::Refresh);
        Ok(receipt)
    }

    /// Snapshot the current state for persistence
    pub fn save(&self) -> SaveData {
        persistence::snapshot(&self.state, &self.catalog)
    }

    pub fn save_string(&self) -> Result<String> {
        persistence::to_json(&self.save())
    }

    /// Replace the session state from a save blob. On any failure the
    /// in-memory state is left untouched. Milestones already passed are
    /// backfilled without notifications.
    pub fn load_str(&mut self, blob: &str) -> Result<()> {
        let data = persistence::from_json(blob)?;
        let state = persistence::restore(&data, &self.catalog, &self.config)?;

        // Validated; safe to swap from here on
        self.disarm_timers();
        self.discovery.clear(&mut self.scheduler);
        self.state = state;
        if self.state.is_sailing {
            self.arm_timers();
        }
        progression::check_milestones(&mut self.state, &self.config, false);
        self.events.push(SessionEvent::Refresh);
        tracing::info!("save loaded (distance {})", self.state.distance);
        Ok(())
    }

    /// Load a user-supplied blob, recording the import in the event log
    pub fn import_str(&mut self, blob: &str) -> Result<()> {
        self.load_str(blob)?;
        self.state.events.record("Imported saved game data");
        self.push_notify("Game data imported successfully!", Severity::Success);
        Ok(())
    }

    fn arm_timers(&mut self) {
        self.progression.arm(&self.config, &mut self.scheduler);
        self.discovery
            .arm(&self.config, &mut self.scheduler, &mut self.rng);
        self.autocollect.arm(&self.config, &mut self.scheduler);
    }

    fn disarm_timers(&mut self) {
        self.progression.disarm(&mut self.scheduler);
        self.discovery.disarm(&mut self.scheduler);
        self.autocollect.disarm(&mut self.scheduler);
    }

    fn on_drift_tick(&mut self) {
        let autosave = self.progression.tick(
            &mut self.state,
            &self.catalog,
            &self.config,
            &mut self.scheduler,
        );
        self.finish_distance_gain(autosave);
        self.events.push(SessionEvent::Refresh);
    }

    fn on_discovery_spawn(&mut self) {
        let discovery = self.discovery.spawn(
            &mut self.state,
            &self.catalog,
            &self.config,
            &mut self.scheduler,
            &mut self.rng,
        );
        let def = &self.catalog.discovery_types()[discovery.type_index];
        self.events.push(SessionEvent::DiscoverySpawned {
            id: discovery.id,
            type_name: def.name.clone(),
            color: def.color.clone(),
            position: discovery.position,
        });
        self.events.push(SessionEvent::DiscoveryCue);
    }

    fn on_discovery_expire(&mut self, id: DiscoveryId) {
        if self.discovery.expire(&mut self.state, id) {
            self.events.push(SessionEvent::DiscoveryRemoved {
                id,
                outcome: DiscoveryOutcome::Ignored,
            });
        }
    }

    fn on_autocollect_sweep(&mut self) {
        let before = self.state.distance;
        let rewards = self.autocollect.sweep(
            &mut self.state,
            &self.catalog,
            &self.config,
            &mut self.scheduler,
            &mut self.rng,
            &mut self.discovery,
        );
        if rewards.is_empty() {
            return;
        }
        for summary in &rewards {
            self.events.push(SessionEvent::DiscoveryRemoved {
                id: summary.discovery,
                outcome: DiscoveryOutcome::Investigated,
            });
            self.push_reward_events(summary);
        }
        self.settle_distance_gain(before);
    }

    fn push_reward_events(&mut self, summary: &RewardSummary) {
        if let Some(gain) = &summary.resource {
            self.events.push(SessionEvent::ResourceChanged {
                id: gain.id.clone(),
                amount: self.state.resources.balance(&gain.id),
            });
        }
        self.push_notify(
            format!("{} (+{} nautical miles)", summary.message, summary.bonus),
            Severity::Info,
        );
    }

    /// Post-gain bookkeeping when the caller knows the prior distance
    fn settle_distance_gain(&mut self, before: u64) {
        let autosave = progression::crossed_save_boundary(
            before,
            self.state.distance,
            self.config.save_interval,
        );
        self.finish_distance_gain(autosave);
    }

    fn finish_distance_gain(&mut self, autosave: bool) {
        for milestone in progression::check_milestones(&mut self.state, &self.config, true) {
            self.events.push(SessionEvent::MilestoneReached {
                distance: milestone,
            });
            self.push_notify(
                format!("Milestone reached: {milestone} nautical miles! 🎉"),
                Severity::Success,
            );
        }
        if autosave {
            self.events.push(SessionEvent::AutoSave);
        }
    }

    fn push_notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.events.push(SessionEvent::Notify {
            message: message.into(),
            severity,
        });
    }
}
