use serde::{Deserialize, Serialize};

use crate::aggregator::AggregatorError;
use crate::utils::in_timestamp_range;

/// A single price observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub timestamp_ms: i64,
    /// Traded quantity carried by this tick. Zero for pure quote updates.
    pub volume: f64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp_ms: i64) -> Self {
        Tick {
            symbol: symbol.into(),
            price,
            timestamp_ms,
            volume: 0.0,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Price must be finite and strictly positive; volume finite and non-negative;
    /// timestamp within `TimeUtils::TIMESTAMP_LIMIT_MS` of the epoch.
    pub fn validate(&self) -> Result<(), AggregatorError> {
        if !in_timestamp_range(self.timestamp_ms) {
            return Err(AggregatorError::InvalidTick {
                symbol: self.symbol.clone(),
                reason: format!("timestamp {} is out of range", self.timestamp_ms),
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AggregatorError::InvalidTick {
                symbol: self.symbol.clone(),
                reason: format!("price {} is not a positive finite number", self.price),
            });
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(AggregatorError::InvalidTick {
                symbol: self.symbol.clone(),
                reason: format!("volume {} is not a non-negative finite number", self.volume),
            });
        }
        Ok(())
    }
}
