//! Autocollector sweep: resolves pending discoveries without player input
//!
//! Runs on its own fixed cadence, distinct from the drift tick and the spawn
//! timer. Each sweep rolls every installed autocollector against every
//! pending discovery; the first success claims the discovery, so it can
//! never be collected twice even with several autocollectors installed.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::{Catalog, ModuleEffect};
use crate::core::config::SimConfig;
use crate::core::types::DiscoveryId;
use crate::sim::discovery::{DiscoveryScheduler, FoundBy, RewardSummary};
use crate::sim::state::SimulationState;
use crate::sim::timers::{Scheduler, TaskId, TaskKind};

#[derive(Debug, Default)]
pub struct AutoCollector {
    sweep_task: Option<TaskId>,
}

impl AutoCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, config: &SimConfig, scheduler: &mut Scheduler) {
        self.sweep_task = Some(
            scheduler.schedule_in(config.autocollect_interval_ms, TaskKind::AutocollectSweep),
        );
    }

    pub fn disarm(&mut self, scheduler: &mut Scheduler) {
        if let Some(task) = self.sweep_task.take() {
            scheduler.cancel(task);
        }
    }

    /// Handle a fired sweep and re-arm. Collected discoveries resolve
    /// through the same reward path as manual investigation.
    pub fn sweep(
        &mut self,
        state: &mut SimulationState,
        catalog: &Catalog,
        config: &SimConfig,
        scheduler: &mut Scheduler,
        rng: &mut ChaCha8Rng,
        discovery: &mut DiscoveryScheduler,
    ) -> Vec<RewardSummary> {
        self.arm(config, scheduler);

        // Rolls happen in installation order
        let chances: Vec<f64> = state
            .installed
            .iter()
            .filter_map(|m| catalog.module(&m.module_id))
            .filter_map(|def| match def.effect {
                ModuleEffect::Autocollect { chance } => Some(chance),
                ModuleEffect::Map => None,
            })
            .collect();
        if chances.is_empty() {
            return Vec::new();
        }

        let pending: Vec<DiscoveryId> = state.discoveries.iter().map(|d| d.id).collect();
        let mut collected = Vec::new();
        for id in pending {
            let caught = chances.iter().any(|&chance| rng.gen::<f64>() < chance);
            if caught {
                if let Some(summary) =
                    discovery.resolve(state, catalog, scheduler, id, FoundBy::Autocollector)
                {
                    collected.push(summary);
                }
            }
        }
        if !collected.is_empty() {
            tracing::debug!("autocollector resolved {} discoveries", collected.len());
        }
        collected
    }
}
