pub mod core;
pub mod messages;
pub mod worker;

// Re-export key components
pub use core::MarketEngine;
pub use messages::{AggregatorCommand, MarketEvent};
pub use worker::AggregatorHandle;
