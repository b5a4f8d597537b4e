use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

use crate::config::{PORTFOLIO, PortfolioConfig, debug};
use crate::domain::Quote;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("Market is closed")]
    MarketClosed,

    #[error("No quote for {0}")]
    UnknownSymbol(String),

    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    #[error("Invalid price {0}")]
    InvalidPrice(f64),

    #[error("Insufficient balance: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("Insufficient holdings of {symbol}: want {requested}, hold {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: u64,
        held: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum TradeSide {
    #[strum(to_string = "BUY")]
    Buy,
    #[strum(to_string = "SELL")]
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: u64,
    pub avg_price: f64,
}

impl Holding {
    pub fn cost_basis(&self) -> f64 {
        self.quantity as f64 * self.avg_price
    }

    pub fn market_value(&self, ltp: f64) -> f64 {
        self.quantity as f64 * ltp
    }

    pub fn unrealised_pnl(&self, ltp: f64) -> f64 {
        self.market_value(ltp) - self.cost_basis()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: u64,
    pub price: f64,
    pub timestamp_ms: i64,
}

impl Transaction {
    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Paper-trading account: cash, positions and a bounded newest-first trade log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    balance: f64,
    holdings: BTreeMap<String, Holding>,
    history: Vec<Transaction>,
    history_limit: usize,
    next_id: u64,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(&PORTFOLIO)
    }
}

impl Portfolio {
    pub fn new(config: &PortfolioConfig) -> Self {
        Self {
            balance: config.initial_balance,
            holdings: BTreeMap::new(),
            history: Vec::new(),
            history_limit: config.history_limit,
            next_id: 1,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    /// Newest first.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    fn check_order(quantity: u64, price: f64) -> Result<(), TradeError> {
        if quantity == 0 {
            return Err(TradeError::ZeroQuantity);
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(TradeError::InvalidPrice(price));
        }
        Ok(())
    }

    pub fn buy(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        timestamp_ms: i64,
    ) -> Result<Transaction, TradeError> {
        Self::check_order(quantity, price)?;
        let cost = quantity as f64 * price;
        if cost > self.balance {
            return Err(TradeError::InsufficientFunds {
                needed: cost,
                available: self.balance,
            });
        }

        self.balance -= cost;
        let holding = self
            .holdings
            .entry(symbol.to_string())
            .or_insert_with(|| Holding {
                symbol: symbol.to_string(),
                quantity: 0,
                avg_price: 0.0,
            });
        let total_qty = holding.quantity + quantity;
        holding.avg_price = (holding.cost_basis() + cost) / total_qty as f64;
        holding.quantity = total_qty;

        Ok(self.record(symbol, TradeSide::Buy, quantity, price, timestamp_ms))
    }

    pub fn sell(
        &mut self,
        symbol: &str,
        quantity: u64,
        price: f64,
        timestamp_ms: i64,
    ) -> Result<Transaction, TradeError> {
        Self::check_order(quantity, price)?;
        let held = self.holdings.get(symbol).map_or(0, |h| h.quantity);
        if held < quantity {
            return Err(TradeError::InsufficientHoldings {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        if held == quantity {
            self.holdings.remove(symbol);
        } else if let Some(h) = self.holdings.get_mut(symbol) {
            h.quantity -= quantity;
        }
        self.balance += quantity as f64 * price;

        Ok(self.record(symbol, TradeSide::Sell, quantity, price, timestamp_ms))
    }

    fn record(
        &mut self,
        symbol: &str,
        side: TradeSide,
        quantity: u64,
        price: f64,
        timestamp_ms: i64,
    ) -> Transaction {
        let tx = Transaction {
            id: self.next_id,
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            timestamp_ms,
        };
        self.next_id += 1;
        if debug::PRINT_TRADES {
            log::info!(
                "{} {} x {} @ {:.2} = {:.2} (balance {:.2})",
                side,
                quantity,
                symbol,
                price,
                tx.total(),
                self.balance
            );
        }
        // A zero limit keeps no log at all
        self.history.insert(0, tx.clone());
        self.history.truncate(self.history_limit);
        tx
    }

    /// Cash plus every holding marked at its quote's LTP (average price when unquoted).
    pub fn valuation(&self, quotes: &HashMap<String, Quote>) -> f64 {
        self.balance
            + self
                .holdings
                .values()
                .map(|h| h.market_value(quotes.get(&h.symbol).map_or(h.avg_price, |q| q.ltp)))
                .sum::<f64>()
    }
}
