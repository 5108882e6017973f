//! Integration tests for the game session
//!
//! These drive a seeded session through virtual time and verify the full
//! pipeline: discovery spawn -> investigate/expire/autocollect -> reward ->
//! milestone/autosave bookkeeping, plus the purchase transactions and the
//! anchor/resume timer discipline.

use ocean_drift::catalog::data::default_catalog;
use ocean_drift::catalog::{
    Catalog, DiscoveryTypeDef, ModuleDef, ModuleEffect, ResourceDef, VesselDef,
};
use ocean_drift::core::config::SimConfig;
use ocean_drift::core::types::DiscoveryId;
use ocean_drift::sim::session::{DiscoveryOutcome, GameSession, SessionEvent};

// ============================================================================
// Test fixtures
// ============================================================================

/// Single-vessel catalog with one discovery type, for deterministic spawns
fn single_type_catalog(discovery: DiscoveryTypeDef) -> Catalog {
    let resources = vec![ResourceDef {
        id: "wood".into(),
        name: "Wood".into(),
        icon: String::new(),
        rarity: 1,
    }];
    let vessels = vec![VesselDef {
        id: "raft".into(),
        name: "Raft".into(),
        icon: String::new(),
        description: String::new(),
        drift_speed: 1,
        upgrade_cost: None,
        upgrade_material_costs: None,
        upgrade_message: None,
        module_slots: 2,
    }];
    let modules = vec![ModuleDef {
        id: "magnet".into(),
        name: "Magnet".into(),
        icon: String::new(),
        description: String::new(),
        cost: 0,
        material_costs: vec![],
        effect: ModuleEffect::Autocollect { chance: 1.0 },
    }];
    Catalog::new(resources, vessels, modules, vec![discovery]).unwrap()
}

fn wood_find() -> DiscoveryTypeDef {
    DiscoveryTypeDef {
        name: "wood_find".into(),
        color: "#8B4513".into(),
        message: "You found a piece of wood floating by!".into(),
        bonus: 3,
        resource: Some("wood".into()),
    }
}

fn flavor_find() -> DiscoveryTypeDef {
    DiscoveryTypeDef {
        name: "driftwood".into(),
        color: "#8B4513".into(),
        message: "You found driftwood!".into(),
        bonus: 3,
        resource: None,
    }
}

/// Fixed 1s spawn cadence, drift tick pushed far out of the way
fn quiet_drift_config() -> SimConfig {
    SimConfig {
        drift_interval_ms: 1_000_000,
        discovery_min_interval_ms: 1000,
        discovery_max_interval_ms: 1000,
        discovery_duration_ms: 10_000,
        autocollect_interval_ms: 2000,
        ..SimConfig::default()
    }
}

fn spawned_ids(events: &[SessionEvent]) -> Vec<DiscoveryId> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::DiscoverySpawned { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Purchase transactions through the session
// ============================================================================

#[test]
fn test_upgrade_scenario_through_session() {
    let mut session = GameSession::new(default_catalog(), SimConfig::default(), 1);
    session.state.distance = 50;
    session.state.resources.credit("wood", 10);
    session.state.resources.credit("seaweed", 5);

    let receipt = session.upgrade_vessel().unwrap();
    assert_eq!(receipt.from, "Raft");
    assert_eq!(receipt.to, "Small Boat");
    assert_eq!(session.state.distance, 0);
    assert_eq!(session.state.resources.balance("wood"), 0);
    assert_eq!(session.state.resources.balance("seaweed"), 0);
    assert_eq!(session.state.current_vessel, 1);

    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::VesselChanged { index: 1 })));
}

#[test]
fn test_upgraded_speed_applies_on_next_tick() {
    let config = SimConfig {
        discovery_min_interval_ms: 1_000_000,
        discovery_max_interval_ms: 1_000_000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(default_catalog(), config.clone(), 1);
    session.state.distance = 50;
    session.state.resources.credit("wood", 10);
    session.state.resources.credit("seaweed", 5);
    session.upgrade_vessel().unwrap();
    session.drain_events();

    // Small Boat drifts at 2; the upgrade restarted the tick phase
    let before = session.state.distance;
    session.advance(config.drift_interval_ms);
    assert_eq!(session.state.distance, before + 2);
}

#[test]
fn test_install_then_sell_scenario_through_session() {
    let mut session = GameSession::new(default_catalog(), SimConfig::default(), 1);
    session.state.distance = 100;
    session.state.resources.credit("wood", 5);
    session.state.resources.credit("copper", 2);

    session.install_module("autocollector", 0).unwrap();
    let receipt = session.sell_module(0).unwrap();

    assert_eq!(receipt.distance_refund, 66);
    assert_eq!(session.state.distance, 66);
    assert_eq!(session.state.resources.balance("wood"), 2);
    assert_eq!(session.state.resources.balance("copper"), 1);
    assert!(session.state.module_in_slot(0).is_none());
}

// ============================================================================
// Discovery lifecycle
// ============================================================================

#[test]
fn test_expired_flavor_discovery_leaves_no_trace() {
    let config = SimConfig {
        discovery_duration_ms: 500,
        ..quiet_drift_config()
    };
    let mut session = GameSession::new(single_type_catalog(flavor_find()), config, 3);

    let events = session.advance(1000);
    let ids = spawned_ids(&events);
    assert_eq!(ids.len(), 1);
    assert_eq!(session.state.discoveries.len(), 1);

    // Let it expire unclaimed
    let events = session.advance(500);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::DiscoveryRemoved {
            outcome: DiscoveryOutcome::Ignored,
            ..
        }
    )));
    assert!(session.state.discoveries.is_empty());
    assert_eq!(session.state.distance, 0);
    assert_eq!(session.state.resources.balance("wood"), 0);
}

#[test]
fn test_investigate_applies_reward_exactly_once() {
    let mut session = GameSession::new(single_type_catalog(wood_find()), quiet_drift_config(), 3);

    let events = session.advance(1000);
    let ids = spawned_ids(&events);
    assert_eq!(ids.len(), 1);

    let summary = session.investigate(ids[0]).expect("first investigate pays out");
    assert_eq!(summary.bonus, 3);
    assert_eq!(session.state.distance, 3);
    assert_eq!(session.state.resources.balance("wood"), 1);

    // Second call on the same id is a silent no-op
    assert!(session.investigate(ids[0]).is_none());
    assert_eq!(session.state.distance, 3);
    assert_eq!(session.state.resources.balance("wood"), 1);
}

#[test]
fn test_investigated_discovery_survives_its_expiry_time() {
    // Long spawn cadence keeps later spawns (and their expiries) out of
    // the window under test
    let config = SimConfig {
        drift_interval_ms: 1_000_000,
        discovery_min_interval_ms: 100_000,
        discovery_max_interval_ms: 100_000,
        discovery_duration_ms: 2000,
        autocollect_interval_ms: 1_000_000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(single_type_catalog(wood_find()), config, 3);

    let events = session.advance(100_000);
    let ids = spawned_ids(&events);
    session.investigate(ids[0]).unwrap();
    session.drain_events();

    // Advancing past the would-be expiry must not emit a stale removal
    let events = session.advance(5000);
    let removals = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::DiscoveryRemoved { .. }))
        .count();
    assert_eq!(removals, 0, "stale expiry fired for an investigated discovery");
    assert_eq!(session.state.distance, 3);
}

#[test]
fn test_autocollector_resolves_through_same_path() {
    let catalog = single_type_catalog(wood_find());
    let mut session = GameSession::new(catalog, quiet_drift_config(), 3);
    session.install_module("magnet", 0).unwrap();
    session.drain_events();

    // Spawn at t=1000, sweep with chance 1.0 at t=2000
    let events = session.advance(2000);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::DiscoveryRemoved {
            outcome: DiscoveryOutcome::Investigated,
            ..
        }
    )));
    assert_eq!(session.state.distance, 3);
    assert_eq!(session.state.resources.balance("wood"), 1);
    assert!(session
        .state
        .events
        .iter()
        .any(|e| e.message.starts_with("Autocollector retrieved")));
}

// ============================================================================
// Anchoring
// ============================================================================

#[test]
fn test_anchoring_suspends_all_simulation() {
    let config = SimConfig {
        drift_interval_ms: 1000,
        discovery_min_interval_ms: 1000,
        discovery_max_interval_ms: 2000,
        autocollect_interval_ms: 1000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(default_catalog(), config.clone(), 9);

    session.set_sailing(false);
    session.drain_events();

    // A week of anchored wall time contributes nothing
    let events = session.advance(7 * 24 * 3600 * 1000);
    assert_eq!(session.state.distance, 0);
    assert!(session.state.discoveries.is_empty());
    assert!(spawned_ids(&events).is_empty());

    // Resuming re-arms from now: exactly one tick after one interval
    session.set_sailing(true);
    session.drain_events();
    session.advance(config.drift_interval_ms);
    assert_eq!(session.state.distance, 1);
}

#[test]
fn test_double_toggle_does_not_double_spawn() {
    let config = SimConfig {
        drift_interval_ms: 500,
        discovery_min_interval_ms: 1000,
        discovery_max_interval_ms: 1000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(single_type_catalog(flavor_find()), config, 5);

    session.set_sailing(false);
    session.set_sailing(true);
    session.set_sailing(true); // redundant toggle is a no-op
    session.drain_events();

    let events = session.advance(1000);
    assert_eq!(spawned_ids(&events).len(), 1);
    // Two drift timers would double the rate
    assert_eq!(session.state.distance, 2);
}

// ============================================================================
// Milestones and autosave
// ============================================================================

#[test]
fn test_milestones_announce_once() {
    let config = SimConfig {
        drift_interval_ms: 1000,
        discovery_min_interval_ms: 1_000_000,
        discovery_max_interval_ms: 1_000_000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(default_catalog(), config, 2);

    // Ten ticks cross the first milestone
    let events = session.advance(10_000);
    let milestones: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::MilestoneReached { distance } => Some(*distance),
            _ => None,
        })
        .collect();
    assert_eq!(milestones, vec![10]);

    // Further sailing does not re-announce
    let events = session.advance(10_000);
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::MilestoneReached { .. })));
    assert_eq!(session.state.reached_milestones, vec![10]);
}

#[test]
fn test_autosave_fires_on_distance_boundary() {
    let config = SimConfig {
        drift_interval_ms: 1000,
        save_interval: 10,
        discovery_min_interval_ms: 1_000_000,
        discovery_max_interval_ms: 1_000_000,
        ..SimConfig::default()
    };
    let mut session = GameSession::new(default_catalog(), config, 2);

    let events = session.advance(9000);
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::AutoSave)));

    let events = session.advance(1000);
    assert!(events.iter().any(|e| matches!(e, SessionEvent::AutoSave)));
}

#[test]
fn test_milestones_suppressed_on_load() {
    let mut session = GameSession::new(default_catalog(), SimConfig::default(), 2);
    session.state.distance = 1500;
    let blob = session.save_string().unwrap();

    let mut restored = GameSession::new(default_catalog(), SimConfig::default(), 2);
    restored.load_str(&blob).unwrap();
    let events = restored.drain_events();

    // Already-passed milestones are backfilled silently
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::MilestoneReached { .. })));
    assert_eq!(restored.state.reached_milestones, vec![10, 100, 1000]);
    assert!(restored
        .state
        .events
        .iter()
        .all(|e| !e.message.starts_with("Reached")));
}
