pub mod config;
pub mod error;
pub mod types;

pub use config::SimConfig;
pub use error::{DriftError, Result};
