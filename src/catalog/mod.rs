//! Static game catalog: resources, vessels, modules, discovery types
//!
//! Pure data plus id lookups. The whole catalog is validated once at
//! construction; a dangling id in here is a data-authoring bug and fails
//! fast, never a runtime condition.

pub mod data;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::error::{DriftError, Result};

/// A collectible resource definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// 1 = most common. Spawn weight is `(max_rarity + 1) - rarity`.
    pub rarity: u32,
}

/// One entry in a material cost list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialCost {
    pub id: String,
    pub amount: u64,
}

/// A vessel tier. Tiers form a totally ordered ladder; index 0 is the
/// starting hull and only the final tier has `upgrade_cost = None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselDef {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Distance gained per drift tick
    pub drift_speed: u64,
    /// Distance cost to reach the next tier; None on the final tier
    pub upgrade_cost: Option<u64>,
    pub upgrade_material_costs: Option<Vec<MaterialCost>>,
    pub upgrade_message: Option<String>,
    /// Installable module slots this hull provides
    pub module_slots: usize,
}

/// A discovery category that can spawn on the horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryTypeDef {
    pub name: String,
    pub color: String,
    pub message: String,
    /// Distance credited when investigated
    pub bonus: u64,
    /// Resource granted when investigated; None marks a flavor find
    pub resource: Option<String>,
}

/// Passive effect provided by an installed module.
///
/// Closed set, matched exhaustively. An unknown kind in catalog data is a
/// parse error, not a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModuleEffect {
    /// Chance per sweep to resolve each pending discovery
    Autocollect { chance: f64 },
    /// Reserved for the chart view; currently has no simulation effect
    Map,
}

/// An installable upgrade module definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDef {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    /// Distance cost to install
    pub cost: u64,
    pub material_costs: Vec<MaterialCost>,
    pub effect: ModuleEffect,
}

/// The full immutable catalog with id indexes
#[derive(Debug, Clone)]
pub struct Catalog {
    resources: Vec<ResourceDef>,
    vessels: Vec<VesselDef>,
    modules: Vec<ModuleDef>,
    discovery_types: Vec<DiscoveryTypeDef>,
    resource_index: AHashMap<String, usize>,
    module_index: AHashMap<String, usize>,
    max_rarity: u32,
}

impl Catalog {
    pub fn new(
        resources: Vec<ResourceDef>,
        vessels: Vec<VesselDef>,
        modules: Vec<ModuleDef>,
        discovery_types: Vec<DiscoveryTypeDef>,
    ) -> Result<Self> {
        if vessels.is_empty() {
            return Err(DriftError::InvalidCatalog("no vessel tiers defined".into()));
        }
        if discovery_types.is_empty() {
            return Err(DriftError::InvalidCatalog("no discovery types defined".into()));
        }

        let mut resource_index = AHashMap::new();
        for (i, res) in resources.iter().enumerate() {
            if res.rarity < 1 {
                return Err(DriftError::InvalidCatalog(format!(
                    "resource '{}' has rarity {} (must be >= 1)",
                    res.id, res.rarity
                )));
            }
            if resource_index.insert(res.id.clone(), i).is_some() {
                return Err(DriftError::InvalidCatalog(format!(
                    "duplicate resource id '{}'",
                    res.id
                )));
            }
        }

        let known: AHashSet<&str> = resources.iter().map(|r| r.id.as_str()).collect();
        let check_costs = |costs: &[MaterialCost], owner: &str| -> Result<()> {
            for cost in costs {
                if !known.contains(cost.id.as_str()) {
                    return Err(DriftError::InvalidCatalog(format!(
                        "{owner} references unknown resource '{}'",
                        cost.id
                    )));
                }
            }
            Ok(())
        };

        for (i, vessel) in vessels.iter().enumerate() {
            let is_last = i == vessels.len() - 1;
            match (&vessel.upgrade_cost, &vessel.upgrade_material_costs) {
                (Some(_), Some(costs)) if !is_last => {
                    check_costs(costs, &format!("vessel '{}'", vessel.id))?;
                }
                (None, None) if is_last => {}
                (None, None) => {
                    return Err(DriftError::InvalidCatalog(format!(
                        "vessel '{}' has no upgrade cost but is not the final tier",
                        vessel.id
                    )));
                }
                _ => {
                    return Err(DriftError::InvalidCatalog(format!(
                        "vessel '{}' has mismatched upgrade cost fields",
                        vessel.id
                    )));
                }
            }
        }

        let mut module_index = AHashMap::new();
        for (i, module) in modules.iter().enumerate() {
            check_costs(&module.material_costs, &format!("module '{}'", module.id))?;
            if let ModuleEffect::Autocollect { chance } = module.effect {
                if !(0.0..=1.0).contains(&chance) {
                    return Err(DriftError::InvalidCatalog(format!(
                        "module '{}' autocollect chance {chance} outside [0, 1]",
                        module.id
                    )));
                }
            }
            if module_index.insert(module.id.clone(), i).is_some() {
                return Err(DriftError::InvalidCatalog(format!(
                    "duplicate module id '{}'",
                    module.id
                )));
            }
        }

        for def in &discovery_types {
            if let Some(res) = &def.resource {
                if !known.contains(res.as_str()) {
                    return Err(DriftError::InvalidCatalog(format!(
                        "discovery '{}' references unknown resource '{}'",
                        def.name, res
                    )));
                }
            }
        }

        let max_rarity = resources.iter().map(|r| r.rarity).max().unwrap_or(1);

        Ok(Self {
            resources,
            vessels,
            modules,
            discovery_types,
            resource_index,
            module_index,
            max_rarity,
        })
    }

    pub fn resources(&self) -> &[ResourceDef] {
        &self.resources
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceDef> {
        self.resource_index.get(id).map(|&i| &self.resources[i])
    }

    pub fn vessels(&self) -> &[VesselDef] {
        &self.vessels
    }

    pub fn vessel(&self, index: usize) -> Option<&VesselDef> {
        self.vessels.get(index)
    }

    pub fn modules(&self) -> &[ModuleDef] {
        &self.modules
    }

    pub fn module(&self, id: &str) -> Option<&ModuleDef> {
        self.module_index.get(id).map(|&i| &self.modules[i])
    }

    pub fn discovery_types(&self) -> &[DiscoveryTypeDef] {
        &self.discovery_types
    }

    /// Highest rarity rank across all resources (1 if there are none)
    pub fn max_rarity(&self) -> u32 {
        self.max_rarity
    }
}
