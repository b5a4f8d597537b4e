// Tick to candle aggregation
pub mod backfill;
pub mod core;
pub mod error;
mod history;

// Re-export commonly used types
pub use backfill::{DriftSource, ScriptedDrift, synthetic_backfill};
pub use core::{CandleAggregator, ClosedCandle, IngestOutcome};
pub use error::AggregatorError;
