//! Discovery spawning, expiry, and investigation
//!
//! Discoveries appear at randomized intervals, wait a fixed duration, then
//! vanish unclaimed. Each lives through exactly one terminal outcome:
//! investigated (reward applied) or ignored (no reward) — never both.

use ahash::AHashMap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalog;
use crate::core::config::SimConfig;
use crate::core::types::DiscoveryId;
use crate::sim::state::{LiveDiscovery, SimulationState};
use crate::sim::timers::{Scheduler, TaskId, TaskKind};

/// Who resolved a discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundBy {
    Investigation,
    Autocollector,
}

/// Resource payout from a resolved discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGain {
    pub id: String,
    pub name: String,
    pub amount: u64,
}

/// What a resolved discovery paid out, for the caller to present
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSummary {
    pub discovery: DiscoveryId,
    pub type_name: String,
    pub message: String,
    pub bonus: u64,
    pub resource: Option<ResourceGain>,
}

/// Spawns discoveries on a self-rescheduling randomized timer and expires
/// the ones nobody claims.
#[derive(Debug, Default)]
pub struct DiscoveryScheduler {
    spawn_task: Option<TaskId>,
    expire_tasks: AHashMap<DiscoveryId, TaskId>,
}

impl DiscoveryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the spawn timer with a fresh uniform draw from the configured
    /// interval. Called once on start and again after every spawn.
    pub fn arm(&mut self, config: &SimConfig, scheduler: &mut Scheduler, rng: &mut ChaCha8Rng) {
        let delay =
            rng.gen_range(config.discovery_min_interval_ms..=config.discovery_max_interval_ms);
        self.spawn_task = Some(scheduler.schedule_in(delay, TaskKind::DiscoverySpawn));
    }

    /// Cancel the pending spawn timer. Expiry timers for already-visible
    /// discoveries keep running; they fade on their own while anchored.
    pub fn disarm(&mut self, scheduler: &mut Scheduler) {
        if let Some(task) = self.spawn_task.take() {
            scheduler.cancel(task);
        }
    }

    /// Cancel everything, including per-discovery expiry timers. Used when
    /// the whole state is replaced on load.
    pub fn clear(&mut self, scheduler: &mut Scheduler) {
        self.disarm(scheduler);
        for (_, task) in self.expire_tasks.drain() {
            scheduler.cancel(task);
        }
    }

    /// Handle a fired spawn task: create the discovery, arm its expiry, and
    /// re-arm the spawn timer with a new random delay.
    pub fn spawn(
        &mut self,
        state: &mut SimulationState,
        catalog: &Catalog,
        config: &SimConfig,
        scheduler: &mut Scheduler,
        rng: &mut ChaCha8Rng,
    ) -> LiveDiscovery {
        let id = state.allocate_discovery_id();
        let type_index = pick_type_index(catalog, rng);
        let position = 10.0 + rng.gen::<f32>() * 80.0;
        let now = scheduler.now();

        let discovery = LiveDiscovery {
            id,
            type_index,
            position,
            spawned_at_ms: now,
            expires_at_ms: now + config.discovery_duration_ms,
        };
        state.discoveries.push(discovery.clone());

        let expire = scheduler.schedule_in(
            config.discovery_duration_ms,
            TaskKind::DiscoveryExpire(id),
        );
        self.expire_tasks.insert(id, expire);

        tracing::debug!(
            "spawned discovery {:?} ({}) at {:.0}%",
            id,
            catalog.discovery_types()[type_index].name,
            position
        );

        self.arm(config, scheduler, rng);
        discovery
    }

    /// Handle a fired expiry task. Returns true when the discovery was still
    /// present and got removed unclaimed; false when it was already resolved
    /// (an expected race, not an error).
    pub fn expire(&mut self, state: &mut SimulationState, id: DiscoveryId) -> bool {
        self.expire_tasks.remove(&id);
        state.take_discovery(id).is_some()
    }

    /// Resolve a discovery by id: credit the distance bonus and resource,
    /// log the find, and remove it from the live set. Silent no-op (None)
    /// when the id is already gone.
    pub fn resolve(
        &mut self,
        state: &mut SimulationState,
        catalog: &Catalog,
        scheduler: &mut Scheduler,
        id: DiscoveryId,
        found_by: FoundBy,
    ) -> Option<RewardSummary> {
        let discovery = state.take_discovery(id)?;
        if let Some(task) = self.expire_tasks.remove(&id) {
            scheduler.cancel(task);
        }

        let def = &catalog.discovery_types()[discovery.type_index];
        state.distance += def.bonus;

        let resource = def.resource.as_ref().map(|res_id| {
            state.resources.credit(res_id, 1);
            let name = catalog
                .resource(res_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| res_id.clone());
            ResourceGain {
                id: res_id.clone(),
                name,
                amount: 1,
            }
        });

        let label = match found_by {
            FoundBy::Investigation => "Investigated",
            FoundBy::Autocollector => "Autocollector retrieved",
        };
        state.events.record(format!(
            "{} {} (+{} nautical miles)",
            label, def.name, def.bonus
        ));

        Some(RewardSummary {
            discovery: id,
            type_name: def.name.clone(),
            message: def.message.clone(),
            bonus: def.bonus,
            resource,
        })
    }
}

/// Two-stage weighted draw over the discovery table.
///
/// A coin flip picks the resource or flavor pool; within the resource pool
/// each candidate weighs `(max_rarity + 1) - rarity` of its resource, walked
/// cumulatively; the flavor pool is uniform. If the chosen pool is empty the
/// other is used, and the cumulative walk falls back to the pool's first
/// candidate — selection can never fail on a validated catalog.
pub fn pick_type_index(catalog: &Catalog, rng: &mut ChaCha8Rng) -> usize {
    let types = catalog.discovery_types();
    let resource_pool: Vec<usize> = (0..types.len())
        .filter(|&i| types[i].resource.is_some())
        .collect();
    let flavor_pool: Vec<usize> = (0..types.len())
        .filter(|&i| types[i].resource.is_none())
        .collect();

    let use_resources = if resource_pool.is_empty() {
        false
    } else if flavor_pool.is_empty() {
        true
    } else {
        rng.gen_bool(0.5)
    };

    if use_resources {
        let weight = |i: usize| -> u64 {
            let res_id = types[i].resource.as_deref().unwrap_or_default();
            let rarity = catalog.resource(res_id).map(|r| r.rarity).unwrap_or(1);
            u64::from(catalog.max_rarity() + 1 - rarity)
        };
        let total: u64 = resource_pool.iter().map(|&i| weight(i)).sum();
        let mut roll = rng.gen_range(0..total.max(1));
        for &i in &resource_pool {
            let w = weight(i);
            if roll < w {
                return i;
            }
            roll -= w;
        }
        resource_pool[0]
    } else {
        flavor_pool[rng.gen_range(0..flavor_pool.len())]
    }
}
