//! Vessel tier upgrades and module install/sell transactions
//!
//! Each transaction validates affordability in full before touching the
//! ledger or distance, so a refused purchase leaves no partial mutation.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{Catalog, MaterialCost};
use crate::sim::state::{InstalledModule, SimulationState};

/// Why a purchase was refused. Reported to the caller, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionDenied {
    #[error("Not enough materials")]
    InsufficientMaterials,

    #[error("Not enough distance travelled")]
    InsufficientDistance,

    #[error("No further vessel upgrades available")]
    NoFurtherUpgrades,

    #[error("Slot {slot} already has a module installed; sell it first")]
    SlotOccupied { slot: usize },

    #[error("Slot {slot} is out of range for this hull ({slots} slots)")]
    SlotOutOfRange { slot: usize, slots: usize },

    #[error("Slot {slot} is empty")]
    SlotEmpty { slot: usize },

    #[error("Unknown module id: {0}")]
    UnknownModule(String),
}

/// Materials are checked before distance: when both are short, the reported
/// reason surfaces the harder-to-fix constraint first.
fn check_afford(
    state: &SimulationState,
    distance_cost: u64,
    materials: &[MaterialCost],
) -> Result<(), TransactionDenied> {
    if !state.resources.has_all(materials) {
        return Err(TransactionDenied::InsufficientMaterials);
    }
    if state.distance < distance_cost {
        return Err(TransactionDenied::InsufficientDistance);
    }
    Ok(())
}

/// Result of a successful vessel upgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeReceipt {
    pub from: String,
    pub to: String,
    /// Tier-specific announcement from the catalog, if authored
    pub message: Option<String>,
}

/// Advance to the next vessel tier, paying the current tier's upgrade costs.
pub fn upgrade_vessel(
    state: &mut SimulationState,
    catalog: &Catalog,
) -> Result<UpgradeReceipt, TransactionDenied> {
    let current = &catalog.vessels()[state.current_vessel];
    let (cost, materials) = match (current.upgrade_cost, &current.upgrade_material_costs) {
        (Some(cost), Some(materials)) => (cost, materials),
        _ => return Err(TransactionDenied::NoFurtherUpgrades),
    };

    check_afford(state, cost, materials)?;

    state.resources.debit_all(materials);
    state.distance -= cost;
    state.current_vessel += 1;

    let next = &catalog.vessels()[state.current_vessel];
    state
        .events
        .record(format!("Upgraded from {} to {}", current.name, next.name));
    tracing::info!("vessel upgraded: {} -> {}", current.id, next.id);

    Ok(UpgradeReceipt {
        from: current.name.clone(),
        to: next.name.clone(),
        message: current.upgrade_message.clone(),
    })
}

/// Result of a successful module install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReceipt {
    pub module_name: String,
    pub slot: usize,
}

/// Install a module into an empty hull slot, paying its costs. The paid
/// material list is snapshotted on the installed record for later refund.
pub fn install_module(
    state: &mut SimulationState,
    catalog: &Catalog,
    now: DateTime<Utc>,
    module_id: &str,
    slot: usize,
) -> Result<InstallReceipt, TransactionDenied> {
    let module = catalog
        .module(module_id)
        .ok_or_else(|| TransactionDenied::UnknownModule(module_id.to_string()))?;

    if state.module_in_slot(slot).is_some() {
        return Err(TransactionDenied::SlotOccupied { slot });
    }
    let slots = catalog.vessels()[state.current_vessel].module_slots;
    if slot >= slots {
        return Err(TransactionDenied::SlotOutOfRange { slot, slots });
    }

    check_afford(state, module.cost, &module.material_costs)?;

    state.resources.debit_all(&module.material_costs);
    state.distance -= module.cost;
    state.installed.push(InstalledModule {
        module_id: module.id.clone(),
        slot,
        installed_at: now,
        paid_costs: module.material_costs.clone(),
    });

    state
        .events
        .record(format!("Installed {} in slot {}", module.name, slot));
    tracing::info!("module installed: {} in slot {}", module.id, slot);

    Ok(InstallReceipt {
        module_name: module.name.clone(),
        slot,
    })
}

/// Result of a successful module sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellReceipt {
    pub module_name: String,
    pub distance_refund: u64,
    /// Per-material refunds that floored above zero; zero refunds are
    /// omitted rather than shown as +0
    pub material_refunds: Vec<MaterialCost>,
}

/// Sell the module in `slot` for two thirds of its distance cost and half
/// of each material actually paid, truncating toward zero.
pub fn sell_module(
    state: &mut SimulationState,
    catalog: &Catalog,
    slot: usize,
) -> Result<SellReceipt, TransactionDenied> {
    let index = state
        .installed
        .iter()
        .position(|m| m.slot == slot)
        .ok_or(TransactionDenied::SlotEmpty { slot })?;

    let module_id = state.installed[index].module_id.clone();
    let module = catalog
        .module(&module_id)
        .ok_or_else(|| TransactionDenied::UnknownModule(module_id.clone()))?;

    let installed = state.installed.remove(index);
    let distance_refund = module.cost * 2 / 3;
    let material_refunds: Vec<MaterialCost> = installed
        .paid_costs
        .iter()
        .map(|c| MaterialCost {
            id: c.id.clone(),
            amount: c.amount / 2,
        })
        .filter(|c| c.amount > 0)
        .collect();

    state.distance += distance_refund;
    for refund in &material_refunds {
        state.resources.credit(&refund.id, refund.amount);
    }

    let mut breakdown = format!("+{distance_refund} nautical miles");
    for refund in &material_refunds {
        let name = catalog
            .resource(&refund.id)
            .map(|r| r.name.as_str())
            .unwrap_or(refund.id.as_str());
        breakdown.push_str(&format!(", +{} {}", refund.amount, name));
    }
    state.events.record(format!(
        "Sold {} from slot {} ({})",
        module.name, slot, breakdown
    ));
    tracing::info!("module sold: {} from slot {}", module.id, slot);

    Ok(SellReceipt {
        module_name: module.name.clone(),
        distance_refund,
        material_refunds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data::default_catalog;

    fn fresh_state() -> SimulationState {
        SimulationState::new(10)
    }

    #[test]
    fn test_upgrade_spends_both_cost_types() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        state.distance = 50;
        state.resources.credit("wood", 10);
        state.resources.credit("seaweed", 5);

        let receipt = upgrade_vessel(&mut state, &catalog).unwrap();
        assert_eq!(receipt.from, "Raft");
        assert_eq!(receipt.to, "Small Boat");
        assert_eq!(state.distance, 0);
        assert_eq!(state.resources.balance("wood"), 0);
        assert_eq!(state.resources.balance("seaweed"), 0);
        assert_eq!(state.current_vessel, 1);
    }

    #[test]
    fn test_upgrade_materials_reason_takes_priority() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        // Short on both distance and materials
        assert_eq!(
            upgrade_vessel(&mut state, &catalog),
            Err(TransactionDenied::InsufficientMaterials)
        );

        // Materials covered, distance still short
        state.resources.credit("wood", 10);
        state.resources.credit("seaweed", 5);
        assert_eq!(
            upgrade_vessel(&mut state, &catalog),
            Err(TransactionDenied::InsufficientDistance)
        );
        // Refusal left everything untouched
        assert_eq!(state.resources.balance("wood"), 10);
        assert_eq!(state.current_vessel, 0);
    }

    #[test]
    fn test_upgrade_stops_at_final_tier() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        state.current_vessel = catalog.vessels().len() - 1;
        state.distance = 1_000_000;
        assert_eq!(
            upgrade_vessel(&mut state, &catalog),
            Err(TransactionDenied::NoFurtherUpgrades)
        );
    }

    #[test]
    fn test_install_then_sell_refunds() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        state.distance = 100;
        state.resources.credit("wood", 5);
        state.resources.credit("copper", 2);

        install_module(&mut state, &catalog, Utc::now(), "autocollector", 0).unwrap();
        assert_eq!(state.distance, 0);
        assert_eq!(state.resources.balance("wood"), 0);
        assert_eq!(state.resources.balance("copper"), 0);
        assert!(state.module_in_slot(0).is_some());

        let receipt = sell_module(&mut state, &catalog, 0).unwrap();
        assert_eq!(receipt.distance_refund, 66);
        assert_eq!(state.distance, 66);
        assert_eq!(state.resources.balance("wood"), 2);
        assert_eq!(state.resources.balance("copper"), 1);
        assert!(state.module_in_slot(0).is_none());
    }

    #[test]
    fn test_install_refuses_occupied_and_out_of_range_slots() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        state.distance = 500;
        state.resources.credit("wood", 20);
        state.resources.credit("copper", 8);

        install_module(&mut state, &catalog, Utc::now(), "autocollector", 0).unwrap();
        assert_eq!(
            install_module(&mut state, &catalog, Utc::now(), "autocollector", 0),
            Err(TransactionDenied::SlotOccupied { slot: 0 })
        );
        // Raft hull has a single slot
        assert_eq!(
            install_module(&mut state, &catalog, Utc::now(), "autocollector", 1),
            Err(TransactionDenied::SlotOutOfRange { slot: 1, slots: 1 })
        );
    }

    #[test]
    fn test_sell_empty_slot_refused() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        assert_eq!(
            sell_module(&mut state, &catalog, 0),
            Err(TransactionDenied::SlotEmpty { slot: 0 })
        );
    }

    #[test]
    fn test_zero_floor_refund_omitted() {
        let catalog = default_catalog();
        let mut state = fresh_state();
        state.distance = 100;
        state.resources.credit("wood", 5);
        state.resources.credit("copper", 2);
        install_module(&mut state, &catalog, Utc::now(), "autocollector", 0).unwrap();

        // Fake a snapshot where one material floors to zero
        state.installed[0].paid_costs = vec![
            MaterialCost {
                id: "wood".into(),
                amount: 5,
            },
            MaterialCost {
                id: "copper".into(),
                amount: 1,
            },
        ];
        let receipt = sell_module(&mut state, &catalog, 0).unwrap();
        assert_eq!(receipt.material_refunds.len(), 1);
        assert_eq!(receipt.material_refunds[0].id, "wood");
        assert_eq!(state.resources.balance("copper"), 0);
    }
}
