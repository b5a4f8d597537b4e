//! Candle aggregation configuration

use crate::aggregator::AggregatorError;
use crate::domain::PatternSet;
use crate::utils::TimeUtils;

/// Shape of the synthetic backfill drawn before any live tick arrives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackfillSettings {
    // Maximum fractional close-to-close move per seeded candle (0.008 = ±0.8%)
    pub volatility: f64,
    // Maximum fractional wick extension beyond the body
    pub wick_jitter: f64,
}

/// The Master Aggregator Configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorConfig {
    /// Bucket width. Fixed for the lifetime of an aggregator.
    pub interval_width_secs: u32,
    /// Closed candles kept per symbol (the in-progress candle is extra)
    pub history_capacity: usize,
    /// Number of closed candles produced by `seed`
    pub seed_candles: usize,
    /// When true, `ingest` creates state for symbols it has never seen.
    /// When false, symbols must be registered (or seeded) first.
    pub auto_register: bool,
    pub pattern_set: PatternSet,
    pub backfill: BackfillSettings,
}

impl AggregatorConfig {
    pub fn interval_ms(&self) -> i64 {
        self.interval_width_secs as i64 * TimeUtils::MS_IN_S
    }

    pub fn validate(&self) -> Result<(), AggregatorError> {
        if self.interval_width_secs == 0 {
            return Err(AggregatorError::InvalidConfig(
                "interval_width_secs must be at least 1".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(AggregatorError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if self.seed_candles == 0 {
            return Err(AggregatorError::InvalidConfig(
                "seed_candles must be at least 1".to_string(),
            ));
        }
        let BackfillSettings {
            volatility,
            wick_jitter,
        } = self.backfill;
        if !(0.0..1.0).contains(&volatility) || !(0.0..1.0).contains(&wick_jitter) {
            return Err(AggregatorError::InvalidConfig(format!(
                "backfill volatility {volatility} and wick jitter {wick_jitter} must lie in [0, 1)"
            )));
        }
        Ok(())
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AGGREGATOR
    }
}

pub const AGGREGATOR: AggregatorConfig = AggregatorConfig {
    interval_width_secs: 15,
    history_capacity: 100,
    seed_candles: 45,
    auto_register: false,
    pattern_set: PatternSet::Core,

    backfill: BackfillSettings {
        volatility: 0.008,
        wick_jitter: 0.003,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AGGREGATOR.validate().is_ok());
        assert_eq!(AGGREGATOR.interval_ms(), 15_000);
    }

    #[test]
    fn test_rejects_zero_sizes() {
        let cfg = AggregatorConfig {
            history_capacity: 0,
            ..AGGREGATOR
        };
        assert!(matches!(cfg.validate(), Err(AggregatorError::InvalidConfig(_))));

        let cfg = AggregatorConfig {
            interval_width_secs: 0,
            ..AGGREGATOR
        };
        assert!(cfg.validate().is_err());

        let cfg = AggregatorConfig {
            seed_candles: 0,
            ..AGGREGATOR
        };
        assert!(cfg.validate().is_err());
    }
}
