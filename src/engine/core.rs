use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::aggregator::{AggregatorError, CandleAggregator};
use crate::config::MARKET;
use crate::data::MarketSnapshot;
use crate::domain::{Candle, Quote};
use crate::portfolio::{Portfolio, TradeError, TradeSide, Transaction};
use crate::simulation::{MarketSession, RandomWalk, SessionState};

use super::messages::MarketEvent;

/// The simulated exchange: session clock, price feed, per-symbol quotes,
/// candle aggregation and the paper-trading account, stepped by the caller.
pub struct MarketEngine {
    session: MarketSession,
    walk: RandomWalk,
    aggregator: CandleAggregator,
    quotes: HashMap<String, Quote>,
    portfolio: Portfolio,
    /// Watchlist order
    symbols: Vec<String>,
}

impl MarketEngine {
    pub fn new(
        aggregator: CandleAggregator,
        walk: RandomWalk,
        portfolio: Portfolio,
        symbols: Vec<String>,
    ) -> Self {
        let symbols: Vec<String> = symbols.into_iter().unique().collect();
        Self {
            session: MarketSession::default(),
            walk,
            aggregator,
            quotes: HashMap::new(),
            portfolio,
            symbols,
        }
    }

    /// Give every watchlist symbol a starting price and history.
    ///
    /// With a snapshot, prices resume from the last known LTP and stored
    /// histories are restored when their bucket width matches. Anything not
    /// covered starts from the reference price with a synthetic backfill.
    pub fn seed_all(
        &mut self,
        now_ms: i64,
        snapshot: Option<&MarketSnapshot>,
    ) -> Result<(), AggregatorError> {
        let interval_ms = self.aggregator.interval_ms();
        for symbol in &self.symbols {
            let price = snapshot
                .and_then(|s| s.last_price(symbol))
                .filter(|p| p.is_finite() && *p > 0.0)
                .unwrap_or_else(|| MARKET.base_price(symbol));

            let stored = snapshot
                .filter(|s| s.interval_ms == interval_ms)
                .and_then(|s| s.histories.get(symbol))
                .filter(|h| !h.is_empty());

            let restored = match stored {
                Some(history) => match self.aggregator.restore(symbol, history.clone()) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("[{}] Discarding stored history: {}", symbol, e);
                        false
                    }
                },
                None => false,
            };
            if !restored {
                self.aggregator.seed(symbol, price, now_ms)?;
            }
            let quote = match snapshot.and_then(|s| s.quotes.get(symbol)) {
                Some(stored) => {
                    let mut quote = stored.clone();
                    quote.reset_session(price);
                    quote
                }
                None => Quote::new(symbol.as_str(), price),
            };
            self.quotes.insert(symbol.clone(), quote);
        }
        log::info!(
            "Seeded {} symbols ({})",
            self.symbols.len(),
            if snapshot.is_some() { "from snapshot" } else { "reference prices" }
        );
        Ok(())
    }

    /// Advance the feed by one period: one tick per symbol, all stamped `now_ms`.
    /// A closed market produces nothing.
    pub fn step(&mut self, now_ms: i64) -> Vec<MarketEvent> {
        let mut events = Vec::new();
        if !self.session.is_open() {
            return events;
        }

        for symbol in &self.symbols {
            let Some(quote) = self.quotes.get_mut(symbol) else {
                continue;
            };
            let tick = self.walk.next_tick(symbol, quote.ltp, now_ms);
            match self.aggregator.ingest_tick(&tick) {
                Ok(outcome) => {
                    quote.apply(tick.price, tick.volume);
                    if outcome.clock_regressed {
                        events.push(MarketEvent::ClockRegression {
                            symbol: symbol.clone(),
                            timestamp_ms: now_ms,
                        });
                    }
                    if let Some(closed) = outcome.closed {
                        events.push(MarketEvent::CandleClosed {
                            symbol: symbol.clone(),
                            closed,
                        });
                    }
                }
                Err(error) => {
                    log::warn!("{}", error);
                    events.push(MarketEvent::TickRejected {
                        symbol: symbol.clone(),
                        error,
                    });
                }
            }
        }
        events
    }

    pub fn toggle_market(&mut self) -> MarketEvent {
        MarketEvent::SessionChanged(self.session.toggle())
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Fill a market order at the symbol's current LTP.
    pub fn place_order(
        &mut self,
        symbol: &str,
        side: TradeSide,
        quantity: u64,
        now_ms: i64,
    ) -> Result<Transaction, TradeError> {
        if !self.session.is_open() {
            return Err(TradeError::MarketClosed);
        }
        let price = self
            .quotes
            .get(symbol)
            .map(|q| q.ltp)
            .ok_or_else(|| TradeError::UnknownSymbol(symbol.to_string()))?;
        match side {
            TradeSide::Buy => self.portfolio.buy(symbol, quantity, price, now_ms),
            TradeSide::Sell => self.portfolio.sell(symbol, quantity, price, now_ms),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    pub fn quotes(&self) -> &HashMap<String, Quote> {
        &self.quotes
    }

    /// Biggest percent gainer since session open. Ties go to the earlier symbol name.
    pub fn top_gainer(&self) -> Option<&Quote> {
        self.top_movers(1).into_iter().next()
    }

    /// `n` quotes with the highest percent change, best first.
    pub fn top_movers(&self, n: usize) -> Vec<&Quote> {
        self.quotes
            .values()
            .sorted_by(|a, b| {
                b.change_pct()
                    .total_cmp(&a.change_pct())
                    .then_with(|| a.symbol.cmp(&b.symbol))
            })
            .take(n)
            .collect()
    }

    pub fn history(&self, symbol: &str) -> Vec<Candle> {
        self.aggregator.history(symbol)
    }

    pub fn aggregator(&self) -> &CandleAggregator {
        &self.aggregator
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn valuation(&self) -> f64 {
        self.portfolio.valuation(&self.quotes)
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        let quotes: BTreeMap<String, Quote> = self
            .quotes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let histories: BTreeMap<String, Vec<Candle>> = self
            .symbols
            .iter()
            .map(|s| (s.clone(), self.aggregator.history(s)))
            .collect();
        MarketSnapshot::new(self.aggregator.interval_ms(), quotes, histories)
    }
}
