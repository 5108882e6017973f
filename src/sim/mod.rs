pub mod autocollect;
pub mod discovery;
pub mod progression;
pub mod session;
pub mod state;
pub mod timers;
pub mod vessel;

pub use session::{DiscoveryOutcome, GameSession, SessionEvent};
pub use state::SimulationState;
