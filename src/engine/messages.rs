use std::sync::mpsc::Sender;

use crate::aggregator::{AggregatorError, ClosedCandle, IngestOutcome};
use crate::domain::{Candle, Tick};
use crate::simulation::SessionState;

/// A request to the aggregator worker. Every variant except `Shutdown`
/// carries the channel its answer goes back on.
#[derive(Debug)]
pub enum AggregatorCommand {
    Register {
        symbol: String,
        reply: Sender<bool>,
    },
    Seed {
        symbol: String,
        initial_price: f64,
        now_ms: i64,
        reply: Sender<Result<Vec<Candle>, AggregatorError>>,
    },
    Ingest {
        tick: Tick,
        reply: Sender<Result<IngestOutcome, AggregatorError>>,
    },
    History {
        symbol: String,
        reply: Sender<Vec<Candle>>,
    },
    Shutdown,
}

/// Something a market step produced that callers may want to render or log
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    CandleClosed { symbol: String, closed: ClosedCandle },
    ClockRegression { symbol: String, timestamp_ms: i64 },
    TickRejected { symbol: String, error: AggregatorError },
    SessionChanged(SessionState),
}
