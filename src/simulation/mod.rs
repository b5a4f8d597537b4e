// Simulated market feed
pub mod error;
pub mod random_walk;
pub mod session;

// Re-export commonly used types
pub use error::SimulationError;
pub use random_walk::{RandomWalk, SimDirection, SimStepSize, round_price};
pub use session::{MarketSession, SessionState};
