//! Built-in default catalog
//!
//! The shipped game data: five resources, three vessel tiers, one installable
//! module, and the discovery table (six flavor finds plus one per resource).

use super::{
    Catalog, DiscoveryTypeDef, MaterialCost, ModuleDef, ModuleEffect, ResourceDef, VesselDef,
};

fn cost(id: &str, amount: u64) -> MaterialCost {
    MaterialCost {
        id: id.into(),
        amount,
    }
}

fn resource(id: &str, name: &str, icon: &str, rarity: u32) -> ResourceDef {
    ResourceDef {
        id: id.into(),
        name: name.into(),
        icon: icon.into(),
        rarity,
    }
}

fn discovery(
    name: &str,
    color: &str,
    message: &str,
    bonus: u64,
    resource: Option<&str>,
) -> DiscoveryTypeDef {
    DiscoveryTypeDef {
        name: name.into(),
        color: color.into(),
        message: message.into(),
        bonus,
        resource: resource.map(Into::into),
    }
}

/// The shipped catalog. Infallible: the data is compiled in and covered by
/// the same validation as externally supplied catalogs.
pub fn default_catalog() -> Catalog {
    let resources = vec![
        resource("seaweed", "Seaweed", "🌿", 1),
        resource("wood", "Wood", "🪵", 2),
        resource("plank", "Plank", "📏", 3),
        resource("cloth", "Cloth", "🧵", 4),
        resource("copper", "Copper", "🔶", 5),
    ];

    let vessels = vec![
        VesselDef {
            id: "raft".into(),
            name: "Raft".into(),
            icon: "🏊".into(),
            description: "A simple wooden raft".into(),
            drift_speed: 1,
            upgrade_cost: Some(50),
            upgrade_material_costs: Some(vec![cost("wood", 10), cost("seaweed", 5)]),
            upgrade_message: Some(
                "You've upgraded to a small boat! Drift speed increased.".into(),
            ),
            module_slots: 1,
        },
        VesselDef {
            id: "boat1".into(),
            name: "Small Boat".into(),
            icon: "🚣".into(),
            description: "A small rowing boat".into(),
            drift_speed: 2,
            upgrade_cost: Some(200),
            upgrade_material_costs: Some(vec![
                cost("wood", 20),
                cost("plank", 10),
                cost("cloth", 5),
            ]),
            upgrade_message: Some(
                "You've upgraded to a sailing boat! Drift speed increased significantly.".into(),
            ),
            module_slots: 4,
        },
        VesselDef {
            id: "boat2".into(),
            name: "Sailing Boat".into(),
            icon: "⛵".into(),
            description: "A proper sailing boat with a sail".into(),
            drift_speed: 4,
            upgrade_cost: None,
            upgrade_material_costs: None,
            upgrade_message: None,
            module_slots: 6,
        },
    ];

    let modules = vec![ModuleDef {
        id: "autocollector".into(),
        name: "Autocollector".into(),
        icon: "🧲".into(),
        description: "Automatically collects discoveries with a 10% chance".into(),
        cost: 100,
        material_costs: vec![cost("wood", 5), cost("copper", 2)],
        effect: ModuleEffect::Autocollect { chance: 0.1 },
    }];

    let discovery_types = vec![
        discovery(
            "driftwood",
            "#8B4513",
            "You found driftwood! It can be used for repairs.",
            2,
            None,
        ),
        discovery(
            "bottle",
            "#2E8B57",
            "You found a message in a bottle with ancient wisdom!",
            3,
            None,
        ),
        discovery(
            "treasure",
            "#FFD700",
            "You found a small treasure chest with gold coins!",
            5,
            None,
        ),
        discovery(
            "coral",
            "#FF6B6B",
            "You discovered a beautiful piece of coral!",
            2,
            None,
        ),
        discovery("seashell", "#E6E6FA", "You found a rare seashell!", 1, None),
        discovery(
            "starfish",
            "#FF7F50",
            "You discovered a vibrant starfish!",
            2,
            None,
        ),
        discovery(
            "seaweed_discovery",
            "#3CB371",
            "You found some seaweed floating in the water!",
            1,
            Some("seaweed"),
        ),
        discovery(
            "wood_discovery",
            "#8B4513",
            "You found a piece of wood floating by!",
            2,
            Some("wood"),
        ),
        discovery(
            "plank_discovery",
            "#DEB887",
            "You discovered a well-crafted plank!",
            3,
            Some("plank"),
        ),
        discovery(
            "cloth_discovery",
            "#B0C4DE",
            "You found a piece of cloth from a distant land!",
            4,
            Some("cloth"),
        ),
        discovery(
            "copper_discovery",
            "#CD7F32",
            "You discovered a rare piece of copper!",
            5,
            Some("copper"),
        ),
    ];

    Catalog::new(resources, vessels, modules, discovery_types)
        .expect("built-in catalog is valid")
}
