//! Configuration module for the Nexora market simulator.

pub mod aggregator;
pub mod debug;
pub mod market;
pub mod persistence;
pub mod portfolio;
pub mod simulation;

// Re-export commonly used items
pub use aggregator::{AGGREGATOR, AggregatorConfig, BackfillSettings};
pub use market::{MARKET, MarketConfig, Sector};
pub use persistence::{PERSISTENCE, snapshot_filename};
pub use portfolio::{PORTFOLIO, PortfolioConfig};
pub use simulation::{SIMULATION, SimulationConfig};
