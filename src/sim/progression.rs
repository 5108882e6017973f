//! Drift progression: fixed-rate distance ticks and milestone detection

use crate::catalog::Catalog;
use crate::core::config::SimConfig;
use crate::sim::state::SimulationState;
use crate::sim::timers::{Scheduler, TaskId, TaskKind};

/// Advances distance at the current vessel's drift speed on a fixed cadence
#[derive(Debug, Default)]
pub struct ProgressionEngine {
    tick_task: Option<TaskId>,
}

impl ProgressionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, config: &SimConfig, scheduler: &mut Scheduler) {
        self.tick_task = Some(scheduler.schedule_in(config.drift_interval_ms, TaskKind::DriftTick));
    }

    pub fn disarm(&mut self, scheduler: &mut Scheduler) {
        if let Some(task) = self.tick_task.take() {
            scheduler.cancel(task);
        }
    }

    /// Re-arm from now. Resets only the phase of the fixed-rate timer;
    /// accrued distance is untouched. Used when a vessel upgrade changes
    /// drift speed mid-interval.
    pub fn restart(&mut self, config: &SimConfig, scheduler: &mut Scheduler) {
        self.disarm(scheduler);
        self.arm(config, scheduler);
    }

    /// Handle a fired drift tick. Credits drift speed and re-arms. Returns
    /// true when an autosave boundary was crossed.
    pub fn tick(
        &mut self,
        state: &mut SimulationState,
        catalog: &Catalog,
        config: &SimConfig,
        scheduler: &mut Scheduler,
    ) -> bool {
        let speed = catalog.vessels()[state.current_vessel].drift_speed;
        let before = state.distance;
        state.distance += speed;
        self.arm(config, scheduler);
        crossed_save_boundary(before, state.distance, config.save_interval)
    }
}

/// True when the distance moved across a multiple of `interval`. Integer
/// division, so drift speeds greater than 1 cannot step over a multiple
/// unnoticed.
pub fn crossed_save_boundary(before: u64, after: u64, interval: u64) -> bool {
    interval > 0 && before / interval != after / interval
}

/// Scan for newly crossed milestones, appending them to the reached set.
/// With `notify` the crossing is also written to the event log; loading a
/// save passes false to backfill silently.
pub fn check_milestones(
    state: &mut SimulationState,
    config: &SimConfig,
    notify: bool,
) -> Vec<u64> {
    let mut crossed = Vec::new();
    for &milestone in &config.milestones {
        if state.distance >= milestone && !state.reached_milestones.contains(&milestone) {
            state.reached_milestones.push(milestone);
            if notify {
                state
                    .events
                    .record(format!("Reached {milestone} nautical miles"));
                tracing::info!("milestone reached: {milestone}");
            }
            crossed.push(milestone);
        }
    }
    crossed
}

/// Log-scaled journey fraction in [0, 1] for the progress readout
pub fn progress_fraction(config: &SimConfig, distance: u64) -> f64 {
    let max = (config.max_distance.max(2)) as f64;
    let d = (distance.max(1)) as f64;
    (d.log10() / max.log10()).clamp(0.0, 1.0)
}
