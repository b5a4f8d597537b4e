use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use crate::aggregator::{AggregatorError, CandleAggregator, DriftSource, IngestOutcome};
use crate::domain::{Candle, Tick};

use super::messages::AggregatorCommand;

/// Owns a `CandleAggregator` on a dedicated thread so several producers can
/// feed it through a channel. Commands are applied in arrival order.
pub struct AggregatorHandle {
    tx: Sender<AggregatorCommand>,
    thread: Option<JoinHandle<()>>,
}

fn run_worker<D: DriftSource>(mut aggregator: CandleAggregator<D>, rx: Receiver<AggregatorCommand>) {
    // Replies are best effort: a caller that gave up waiting is not an error
    while let Ok(cmd) = rx.recv() {
        match cmd {
            AggregatorCommand::Register { symbol, reply } => {
                let _ = reply.send(aggregator.register_symbol(&symbol));
            }
            AggregatorCommand::Seed {
                symbol,
                initial_price,
                now_ms,
                reply,
            } => {
                let _ = reply.send(aggregator.seed(&symbol, initial_price, now_ms));
            }
            AggregatorCommand::Ingest { tick, reply } => {
                let _ = reply.send(aggregator.ingest_tick(&tick));
            }
            AggregatorCommand::History { symbol, reply } => {
                let _ = reply.send(aggregator.history(&symbol));
            }
            AggregatorCommand::Shutdown => break,
        }
    }
    log::debug!("Aggregator worker stopped");
}

impl AggregatorHandle {
    pub fn spawn<D>(aggregator: CandleAggregator<D>) -> Self
    where
        D: DriftSource + Send + 'static,
    {
        let (tx, rx) = channel::<AggregatorCommand>();
        let thread = thread::spawn(move || run_worker(aggregator, rx));
        Self {
            tx,
            thread: Some(thread),
        }
    }

    fn request<T>(
        &self,
        make: impl FnOnce(Sender<T>) -> AggregatorCommand,
    ) -> Result<T, AggregatorError> {
        let (reply_tx, reply_rx) = channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| AggregatorError::WorkerUnavailable)?;
        reply_rx.recv().map_err(|_| AggregatorError::WorkerUnavailable)
    }

    pub fn register_symbol(&self, symbol: &str) -> Result<bool, AggregatorError> {
        self.request(|reply| AggregatorCommand::Register {
            symbol: symbol.to_string(),
            reply,
        })
    }

    pub fn seed(
        &self,
        symbol: &str,
        initial_price: f64,
        now_ms: i64,
    ) -> Result<Vec<Candle>, AggregatorError> {
        self.request(|reply| AggregatorCommand::Seed {
            symbol: symbol.to_string(),
            initial_price,
            now_ms,
            reply,
        })?
    }

    pub fn ingest(&self, tick: Tick) -> Result<IngestOutcome, AggregatorError> {
        self.request(|reply| AggregatorCommand::Ingest { tick, reply })?
    }

    pub fn history(&self, symbol: &str) -> Result<Vec<Candle>, AggregatorError> {
        self.request(|reply| AggregatorCommand::History {
            symbol: symbol.to_string(),
            reply,
        })
    }
}

impl Drop for AggregatorHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(AggregatorCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Aggregator worker panicked");
            }
        }
    }
}
