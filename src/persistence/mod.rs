//! Versioned save blob codec
//!
//! camelCase JSON matching saves written by earlier versions of the game.
//! Fields added after the first release are optional with zero defaults so
//! old blobs still load; `distance` and `eventHistory` are the required
//! core and their absence marks a corrupt save.

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, MaterialCost};
use crate::core::config::SimConfig;
use crate::core::error::{DriftError, Result};
use crate::sim::state::{EventEntry, EventLog, InstalledModule, SimulationState};

pub const SAVE_VERSION: &str = "1.3";

/// One installed module as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedUpgrade {
    pub upgrade_id: String,
    pub slot_index: usize,
    pub installed_at: DateTime<Utc>,
    #[serde(default)]
    pub material_costs: Vec<MaterialCost>,
}

/// The full persisted snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(default)]
    pub version: Option<String>,
    pub distance: u64,
    #[serde(default = "default_sailing")]
    pub is_sailing: bool,
    pub event_history: Vec<EventEntry>,
    #[serde(default)]
    pub reached_milestones: Vec<u64>,
    #[serde(default)]
    pub current_vessel_index: usize,
    #[serde(default)]
    pub resources: AHashMap<String, u64>,
    #[serde(default)]
    pub installed_upgrades: Vec<SavedUpgrade>,
    #[serde(default, alias = "exportedAt")]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_sailing() -> bool {
    true
}

/// Snapshot the live state. The resource map is zero-filled over the whole
/// catalog so older saves never lack a key a newer catalog expects.
pub fn snapshot(state: &SimulationState, catalog: &Catalog) -> SaveData {
    let mut resources = AHashMap::new();
    for def in catalog.resources() {
        resources.insert(def.id.clone(), state.resources.balance(&def.id));
    }

    SaveData {
        version: Some(SAVE_VERSION.to_string()),
        distance: state.distance,
        is_sailing: state.is_sailing,
        event_history: state.events.to_vec(),
        reached_milestones: state.reached_milestones.clone(),
        current_vessel_index: state.current_vessel,
        resources,
        installed_upgrades: state
            .installed
            .iter()
            .map(|m| SavedUpgrade {
                upgrade_id: m.module_id.clone(),
                slot_index: m.slot,
                installed_at: m.installed_at,
                material_costs: m.paid_costs.clone(),
            })
            .collect(),
        saved_at: Some(Utc::now()),
    }
}

pub fn to_json(data: &SaveData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parse a save blob. Malformed JSON or missing required fields surface as
/// `CorruptSave`; the caller declines to load and keeps its current state.
pub fn from_json(blob: &str) -> Result<SaveData> {
    serde_json::from_str(blob).map_err(|e| DriftError::CorruptSave(e.to_string()))
}

/// Rebuild a `SimulationState` from parsed save data against the current
/// catalog. Unknown resource ids are ignored, unknown or conflicting
/// installed modules skipped with a warning; an out-of-range vessel index
/// is a corrupt save.
pub fn restore(
    data: &SaveData,
    catalog: &Catalog,
    config: &SimConfig,
) -> Result<SimulationState> {
    if data.current_vessel_index >= catalog.vessels().len() {
        return Err(DriftError::CorruptSave(format!(
            "vessel index {} out of range ({} tiers)",
            data.current_vessel_index,
            catalog.vessels().len()
        )));
    }

    let mut state = SimulationState::new(config.max_event_history);
    state.distance = data.distance;
    state.is_sailing = data.is_sailing;
    state.current_vessel = data.current_vessel_index;
    state.reached_milestones = data.reached_milestones.clone();
    state.events = EventLog::from_entries(config.max_event_history, data.event_history.clone());

    for (id, &amount) in &data.resources {
        if catalog.resource(id).is_some() {
            state.resources.set(id, amount);
        } else {
            tracing::warn!("ignoring unknown resource '{id}' in save");
        }
    }

    let slots = catalog.vessels()[state.current_vessel].module_slots;
    for saved in &data.installed_upgrades {
        if catalog.module(&saved.upgrade_id).is_none() {
            tracing::warn!("skipping unknown module '{}' in save", saved.upgrade_id);
            continue;
        }
        if saved.slot_index >= slots {
            tracing::warn!(
                "skipping module '{}' in out-of-range slot {}",
                saved.upgrade_id,
                saved.slot_index
            );
            continue;
        }
        if state.module_in_slot(saved.slot_index).is_some() {
            tracing::warn!(
                "skipping duplicate module in slot {}",
                saved.slot_index
            );
            continue;
        }
        state.installed.push(InstalledModule {
            module_id: saved.upgrade_id.clone(),
            slot: saved.slot_index,
            installed_at: saved.installed_at,
            paid_costs: saved.material_costs.clone(),
        });
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::default_catalog;

    #[test]
    fn test_minimal_blob_loads_with_defaults() {
        let catalog = default_catalog();
        let config = SimConfig::default();

        let data = from_json(r#"{"distance": 42, "eventHistory": []}"#).unwrap();
        assert!(data.is_sailing);
        assert!(data.resources.is_empty());

        let state = restore(&data, &catalog, &config).unwrap();
        assert_eq!(state.distance, 42);
        assert_eq!(state.current_vessel, 0);
        assert_eq!(state.resources.balance("wood"), 0);
        assert!(state.installed.is_empty());
    }

    #[test]
    fn test_missing_required_fields_are_corrupt() {
        assert!(matches!(
            from_json(r#"{"eventHistory": []}"#),
            Err(DriftError::CorruptSave(_))
        ));
        assert!(matches!(
            from_json(r#"{"distance": 5}"#),
            Err(DriftError::CorruptSave(_))
        ));
        assert!(matches!(
            from_json("not json at all"),
            Err(DriftError::CorruptSave(_))
        ));
    }

    #[test]
    fn test_exported_at_alias_accepted() {
        let data = from_json(
            r#"{"distance": 1, "eventHistory": [], "exportedAt": "2025-06-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert!(data.saved_at.is_some());
    }

    #[test]
    fn test_out_of_range_vessel_index_is_corrupt() {
        let catalog = default_catalog();
        let config = SimConfig::default();
        let data =
            from_json(r#"{"distance": 1, "eventHistory": [], "currentVesselIndex": 9}"#).unwrap();
        assert!(matches!(
            restore(&data, &catalog, &config),
            Err(DriftError::CorruptSave(_))
        ));
    }

    #[test]
    fn test_unknown_module_and_duplicate_slot_skipped() {
        let catalog = default_catalog();
        let config = SimConfig::default();
        let blob = r#"{
            "distance": 1,
            "eventHistory": [],
            "installedUpgrades": [
                {"upgradeId": "warp_drive", "slotIndex": 0, "installedAt": "2025-06-01T12:00:00Z"},
                {"upgradeId": "autocollector", "slotIndex": 0, "installedAt": "2025-06-01T12:00:00Z"},
                {"upgradeId": "autocollector", "slotIndex": 0, "installedAt": "2025-06-02T12:00:00Z"}
            ]
        }"#;
        let state = restore(&from_json(blob).unwrap(), &catalog, &config).unwrap();
        // Unknown module dropped, first valid install wins the slot
        assert_eq!(state.installed.len(), 1);
        assert_eq!(state.installed[0].module_id, "autocollector");
    }

    #[test]
    fn test_unknown_resource_ignored() {
        let catalog = default_catalog();
        let config = SimConfig::default();
        let blob = r#"{
            "distance": 1,
            "eventHistory": [],
            "resources": {"wood": 7, "unobtainium": 99}
        }"#;
        let state = restore(&from_json(blob).unwrap(), &catalog, &config).unwrap();
        assert_eq!(state.resources.balance("wood"), 7);
        assert_eq!(state.resources.balance("unobtainium"), 0);
    }

    #[test]
    fn test_snapshot_zero_fills_catalog_resources() {
        let catalog = default_catalog();
        let mut state = SimulationState::new(10);
        state.resources.credit("wood", 3);

        let data = snapshot(&state, &catalog);
        assert_eq!(data.resources.len(), catalog.resources().len());
        assert_eq!(data.resources.get("wood"), Some(&3));
        assert_eq!(data.resources.get("copper"), Some(&0));
        assert_eq!(data.version.as_deref(), Some(SAVE_VERSION));
    }
}
