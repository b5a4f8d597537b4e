use thiserror::Error;

/// Everything the aggregator can refuse. None of these leave state half-written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Invalid tick for {symbol}: {reason}")]
    InvalidTick { symbol: String, reason: String },

    #[error("Unknown symbol {0}: register or seed it before ingesting")]
    UnknownSymbol(String),

    #[error("Invalid aggregator configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid candle history for {symbol}: {reason}")]
    InvalidHistory { symbol: String, reason: String },

    #[error("Aggregator worker is no longer running")]
    WorkerUnavailable,
}
