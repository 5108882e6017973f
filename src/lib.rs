//! Ocean Drift - Idle Ocean-Drifting Simulation Engine
//!
//! A vessel drifts across the ocean, periodically encountering random
//! discoveries that grant distance and crafting resources, spent on vessel
//! upgrades and installable modules. This crate is the simulation core:
//! timer-driven state machine, weighted discovery spawning, purchase
//! gating, and save/load. Rendering, audio, and notifications are
//! collaborators that drain [`sim::SessionEvent`] batches.

pub mod catalog;
pub mod core;
pub mod persistence;
pub mod sim;
