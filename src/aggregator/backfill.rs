//! Cosmetic history for symbols that have no real candle feed.
//!
//! The generated candles only exist so a chart is not blank on first paint.
//! They must never be treated as market data.

use crate::config::BackfillSettings;
use crate::domain::Candle;

/// Source of uniform samples in `[0, 1)` driving the backfill drift.
pub trait DriftSource {
    fn next_unit(&mut self) -> f64;
}

impl<R: rand::Rng> DriftSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

/// Replays a fixed list of samples, cycling when exhausted. For deterministic tests.
#[derive(Debug, Clone)]
pub struct ScriptedDrift {
    samples: Vec<f64>,
    cursor: usize,
}

impl ScriptedDrift {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }

    /// Always returns the midpoint: zero drift, zero wicks.
    pub fn flat() -> Self {
        Self::new(vec![0.5])
    }
}

impl DriftSource for ScriptedDrift {
    fn next_unit(&mut self) -> f64 {
        if self.samples.is_empty() {
            return 0.5;
        }
        let v = self.samples[self.cursor % self.samples.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

/// Build `count` closed candles starting at `first_bucket_ms`, each opening at the
/// previous close. The final candle closes exactly at `initial_price` so live
/// ticks continue from it.
pub fn synthetic_backfill<D: DriftSource + ?Sized>(
    initial_price: f64,
    first_bucket_ms: i64,
    interval_ms: i64,
    count: usize,
    settings: &BackfillSettings,
    drift: &mut D,
) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut last_close = initial_price;

    for i in 0..count {
        let open = last_close;
        let close = if i + 1 == count {
            initial_price
        } else {
            let change = (drift.next_unit() * 2.0 - 1.0) * settings.volatility;
            open * (1.0 + change)
        };
        let (body_low, body_high) = (open.min(close), open.max(close));
        let high = body_high * (1.0 + drift.next_unit() * settings.wick_jitter);
        let low = body_low * (1.0 - drift.next_unit() * settings.wick_jitter);

        candles.push(Candle::closed(
            first_bucket_ms + i as i64 * interval_ms,
            open,
            high,
            low,
            close,
        ));
        last_close = close;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AGGREGATOR;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_backfill_is_continuous_and_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let candles = synthetic_backfill(498.6, 0, 15_000, 45, &AGGREGATOR.backfill, &mut rng);
        assert_eq!(candles.len(), 45);
        assert_eq!(candles[0].open, 498.6);
        assert_eq!(candles.last().map(|c| c.close), Some(498.6));
        for pair in candles.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert_eq!(pair[1].bucket_start_ms - pair[0].bucket_start_ms, 15_000);
        }
        assert!(candles.iter().all(|c| c.holds_invariants() && !c.is_open));
    }

    #[test]
    fn test_same_seed_same_backfill() {
        let a = synthetic_backfill(
            100.0,
            0,
            1_000,
            10,
            &AGGREGATOR.backfill,
            &mut StdRng::seed_from_u64(42),
        );
        let b = synthetic_backfill(
            100.0,
            0,
            1_000,
            10,
            &AGGREGATOR.backfill,
            &mut StdRng::seed_from_u64(42),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_drift_is_flat() {
        let candles = synthetic_backfill(
            50.0,
            0,
            1_000,
            3,
            &AGGREGATOR.backfill,
            &mut ScriptedDrift::flat(),
        );
        for c in candles {
            assert!((c.open - 50.0).abs() < 1e-12);
            assert!((c.close - 50.0).abs() < 1e-12);
        }
    }
}
