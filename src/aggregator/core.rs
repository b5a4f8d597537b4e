use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::analysis::pattern_tagger::{self, MAX_LOOKBACK};
use crate::config::{AggregatorConfig, debug};
use crate::domain::{Candle, PatternTag, Tick};
use crate::utils::{align_to_interval, in_timestamp_range, is_aligned};

use super::backfill::{DriftSource, synthetic_backfill};
use super::error::AggregatorError;
use super::history::SymbolSeries;

/// A bucket that just closed, with the shape recognised on it (if any).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedCandle {
    pub candle: Candle,
    pub tag: Option<PatternTag>,
}

/// Result of a successful `ingest`.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// The in-progress candle after the tick was applied
    pub updated: Candle,
    /// Set when this tick crossed a bucket boundary
    pub closed: Option<ClosedCandle>,
    /// The tick arrived behind the symbol's clock and was folded into the
    /// current bucket instead of moving time backward
    pub clock_regressed: bool,
}

/// Turns a tick stream into bounded, fixed-interval OHLCV histories keyed by symbol.
///
/// Single writer: calls for the same symbol must arrive in order. The bucket
/// width is fixed at construction; build a new aggregator to change it.
pub struct CandleAggregator<D: DriftSource = StdRng> {
    config: AggregatorConfig,
    interval_ms: i64,
    series: HashMap<String, SymbolSeries>,
    drift: D,
}

impl CandleAggregator<StdRng> {
    /// Aggregator whose backfill drift comes from OS entropy.
    pub fn new(config: AggregatorConfig) -> Result<Self, AggregatorError> {
        Self::with_drift(config, StdRng::from_entropy())
    }

    /// Aggregator with a reproducible backfill.
    pub fn with_rng_seed(config: AggregatorConfig, seed: u64) -> Result<Self, AggregatorError> {
        Self::with_drift(config, StdRng::seed_from_u64(seed))
    }
}

impl<D: DriftSource> CandleAggregator<D> {
    pub fn with_drift(config: AggregatorConfig, drift: D) -> Result<Self, AggregatorError> {
        config.validate()?;
        Ok(Self {
            interval_ms: config.interval_ms(),
            config,
            series: HashMap::new(),
            drift,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    /// Start tracking `symbol`. Returns false if it was already tracked (state untouched).
    pub fn register_symbol(&mut self, symbol: &str) -> bool {
        if self.series.contains_key(symbol) {
            return false;
        }
        self.series.insert(
            symbol.to_string(),
            SymbolSeries::new(self.config.history_capacity),
        );
        true
    }

    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        self.series.remove(symbol).is_some()
    }

    pub fn is_registered(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    /// Tracked symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.keys().cloned().collect();
        names.sort();
        names
    }

    /// Replace `symbol`'s history with a synthetic backfill of closed candles
    /// ending just before the bucket containing `now_ms`. The last candle closes
    /// at `initial_price`, which the next tick carries forward as its open.
    ///
    /// Registers the symbol if needed.
    pub fn seed(
        &mut self,
        symbol: &str,
        initial_price: f64,
        now_ms: i64,
    ) -> Result<Vec<Candle>, AggregatorError> {
        Tick::new(symbol, initial_price, now_ms).validate()?;

        let count = self.config.seed_candles.min(self.config.history_capacity);
        let now_bucket = align_to_interval(now_ms, self.interval_ms);
        let first_bucket = i64::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(self.interval_ms))
            .and_then(|span| now_bucket.checked_sub(span))
            .filter(|b| in_timestamp_range(*b))
            .ok_or_else(|| AggregatorError::InvalidTick {
                symbol: symbol.to_string(),
                reason: format!("backfill of {count} candles before {now_ms} is out of range"),
            })?;
        let candles = synthetic_backfill(
            initial_price,
            first_bucket,
            self.interval_ms,
            count,
            &self.config.backfill,
            &mut self.drift,
        );

        let capacity = self.config.history_capacity;
        self.series
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolSeries::new(capacity))
            .replace(candles.clone(), None);

        log::debug!(
            "[{}] Seeded {} candles ending at {:.2}",
            symbol,
            candles.len(),
            initial_price
        );
        Ok(candles)
    }

    /// Convenience wrapper over [`Self::ingest_tick`] for a volume-less quote.
    pub fn ingest(
        &mut self,
        symbol: &str,
        price: f64,
        now_ms: i64,
    ) -> Result<IngestOutcome, AggregatorError> {
        self.ingest_tick(&Tick::new(symbol, price, now_ms))
    }

    /// Fold one tick into its symbol's series.
    ///
    /// Invalid ticks and unregistered symbols (unless `auto_register` is on)
    /// are rejected without touching any state.
    pub fn ingest_tick(&mut self, tick: &Tick) -> Result<IngestOutcome, AggregatorError> {
        tick.validate()?;
        if debug::PRINT_TICKS {
            log::trace!("[{}] {:.2} @ {}", tick.symbol, tick.price, tick.timestamp_ms);
        }

        let capacity = self.config.history_capacity;
        let pattern_set = self.config.pattern_set;
        let series = if self.config.auto_register {
            self.series.entry(tick.symbol.clone()).or_insert_with(|| {
                log::debug!("[{}] Auto-registered on first tick", tick.symbol);
                SymbolSeries::new(capacity)
            })
        } else {
            self.series
                .get_mut(&tick.symbol)
                .ok_or_else(|| AggregatorError::UnknownSymbol(tick.symbol.clone()))?
        };

        let applied = series.apply(tick.price, tick.volume, tick.timestamp_ms, self.interval_ms);

        if applied.clock_regressed && debug::PRINT_CLOCK_REGRESSIONS {
            log::debug!(
                "[{}] Tick at {} behind symbol clock, absorbed into bucket {}",
                tick.symbol,
                tick.timestamp_ms,
                applied.updated.bucket_start_ms
            );
        }

        let closed = applied.closed.map(|candle| {
            let preceding = series.preceding_last_closed(MAX_LOOKBACK);
            let tag = pattern_tagger::classify_with(&candle, &preceding, pattern_set);
            if debug::PRINT_CANDLE_CLOSES {
                log::info!(
                    "[{}] Closed {} O {:.2} H {:.2} L {:.2} C {:.2}{}",
                    tick.symbol,
                    candle.bucket_start_ms,
                    candle.open,
                    candle.high,
                    candle.low,
                    candle.close,
                    tag.map(|t| format!(" -> {t}")).unwrap_or_default()
                );
            }
            ClosedCandle { candle, tag }
        });

        Ok(IngestOutcome {
            updated: applied.updated,
            closed,
            clock_regressed: applied.clock_regressed,
        })
    }

    /// Closed candles oldest first, then the in-progress candle. Empty for unknown symbols.
    pub fn history(&self, symbol: &str) -> Vec<Candle> {
        self.series
            .get(symbol)
            .map(SymbolSeries::snapshot)
            .unwrap_or_default()
    }

    pub fn in_progress(&self, symbol: &str) -> Option<&Candle> {
        self.series.get(symbol).and_then(SymbolSeries::current)
    }

    pub fn closed_len(&self, symbol: &str) -> usize {
        self.series.get(symbol).map_or(0, |s| s.closed().len())
    }

    /// Close of the in-progress candle, or of the newest closed one.
    pub fn last_close(&self, symbol: &str) -> Option<f64> {
        self.series.get(symbol).and_then(SymbolSeries::last_close)
    }

    /// Load a previously exported history (closed candles oldest first, optionally
    /// ending with one in-progress candle). Rejects anything that breaks the
    /// candle invariants, bucket alignment or strict bucket ordering.
    pub fn restore(&mut self, symbol: &str, candles: Vec<Candle>) -> Result<(), AggregatorError> {
        let invalid = |reason: String| AggregatorError::InvalidHistory {
            symbol: symbol.to_string(),
            reason,
        };

        for (i, c) in candles.iter().enumerate() {
            if !in_timestamp_range(c.bucket_start_ms) {
                return Err(invalid(format!(
                    "candle {i} starts at {} which is out of range",
                    c.bucket_start_ms
                )));
            }
            if !c.holds_invariants() {
                return Err(invalid(format!("candle {i} breaks OHLC invariants")));
            }
            if !is_aligned(c.bucket_start_ms, self.interval_ms) {
                return Err(invalid(format!(
                    "candle {i} starts at {} which is not a multiple of {} ms",
                    c.bucket_start_ms, self.interval_ms
                )));
            }
            if c.is_open && i + 1 != candles.len() {
                return Err(invalid(format!("candle {i} is open but not last")));
            }
        }
        if candles
            .windows(2)
            .any(|w| w[1].bucket_start_ms <= w[0].bucket_start_ms)
        {
            return Err(invalid("buckets are not strictly increasing".to_string()));
        }

        let mut closed = candles;
        let current = match closed.last() {
            Some(c) if c.is_open => closed.pop(),
            _ => None,
        };

        let capacity = self.config.history_capacity;
        self.series
            .entry(symbol.to_string())
            .or_insert_with(|| SymbolSeries::new(capacity))
            .replace(closed, current);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ScriptedDrift;
    use crate::config::AGGREGATOR;
    use crate::domain::{PatternKind, PatternSet, Polarity};

    fn aggregator() -> CandleAggregator<ScriptedDrift> {
        let mut agg = CandleAggregator::with_drift(AGGREGATOR, ScriptedDrift::flat()).unwrap();
        agg.register_symbol("NABIL");
        agg
    }

    fn secs(s: i64) -> i64 {
        s * 1000
    }

    #[test]
    fn test_three_ticks_one_bucket() {
        let mut agg = aggregator();
        agg.ingest("NABIL", 100.0, secs(0)).unwrap();
        agg.ingest("NABIL", 102.0, secs(5)).unwrap();
        let out = agg.ingest("NABIL", 99.0, secs(10)).unwrap();

        assert!(out.closed.is_none());
        let c = out.updated;
        assert_eq!((c.open, c.high, c.low, c.close), (100.0, 102.0, 99.0, 99.0));
        assert!(c.is_open);
        assert_eq!(agg.history("NABIL").len(), 1);
    }

    #[test]
    fn test_boundary_crossing_carries_close_forward() {
        let mut agg = aggregator();
        for (t, p) in [(0, 100.0), (5, 102.0), (10, 99.0)] {
            agg.ingest("NABIL", p, secs(t)).unwrap();
        }
        let out = agg.ingest("NABIL", 101.0, secs(16)).unwrap();

        let closed = out.closed.expect("bucket [0, 15) must close");
        assert_eq!(closed.candle.close, 99.0);
        assert!(!closed.candle.is_open);
        assert_eq!(closed.candle.bucket_start_ms, 0);

        let c = out.updated;
        assert_eq!(c.bucket_start_ms, secs(15));
        assert_eq!((c.open, c.high, c.low, c.close), (99.0, 101.0, 99.0, 101.0));

        let history = agg.history("NABIL");
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_open && history[1].is_open);
    }

    #[test]
    fn test_seed_then_ingest_continues_from_seed() {
        let mut agg = CandleAggregator::with_rng_seed(AGGREGATOR, 11).unwrap();
        let now = 1_700_000_007_000;
        let seeded = agg.seed("NABIL", 498.6, now).unwrap();

        assert_eq!(seeded.len(), AGGREGATOR.seed_candles);
        assert_eq!(seeded.last().map(|c| c.close), Some(498.6));
        assert!(seeded.iter().all(|c| c.holds_invariants()));
        assert!(seeded.iter().all(|c| c.bucket_start_ms % 15_000 == 0));
        assert!(seeded.last().unwrap().bucket_start_ms < align_to_interval(now, 15_000));

        let out = agg.ingest("NABIL", 499.0, now).unwrap();
        assert_eq!(out.updated.open, 498.6);
        assert_eq!(out.updated.bucket_start_ms, align_to_interval(now, 15_000));
        assert!(out.closed.is_none());
        assert_eq!(agg.history("NABIL").len(), AGGREGATOR.seed_candles + 1);
    }

    #[test]
    fn test_rejected_ticks_leave_history_unchanged() {
        let mut agg = aggregator();
        agg.ingest("NABIL", 100.0, secs(0)).unwrap();
        let before = agg.history("NABIL");

        for bad in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = agg.ingest("NABIL", bad, secs(20)).unwrap_err();
            assert!(matches!(err, AggregatorError::InvalidTick { .. }));
        }
        assert_eq!(agg.history("NABIL"), before);
    }

    #[test]
    fn test_unknown_symbol_needs_registration() {
        let mut agg = aggregator();
        let err = agg.ingest("NICA", 321.0, 0).unwrap_err();
        assert_eq!(err, AggregatorError::UnknownSymbol("NICA".to_string()));
        assert!(agg.history("NICA").is_empty());

        let cfg = AggregatorConfig {
            auto_register: true,
            ..AGGREGATOR
        };
        let mut auto = CandleAggregator::with_drift(cfg, ScriptedDrift::flat()).unwrap();
        assert!(auto.ingest("NICA", 321.0, 0).is_ok());
        assert!(auto.is_registered("NICA"));
    }

    #[test]
    fn test_out_of_order_tick_absorbed() {
        let mut agg = aggregator();
        agg.ingest("NABIL", 100.0, secs(20)).unwrap();
        let out = agg.ingest("NABIL", 97.0, secs(3)).unwrap();

        assert!(out.clock_regressed);
        assert!(out.closed.is_none());
        assert_eq!(out.updated.bucket_start_ms, secs(15));
        assert_eq!(out.updated.low, 97.0);
        assert_eq!(out.updated.close, 97.0);
    }

    #[test]
    fn test_history_is_bounded() {
        let cfg = AggregatorConfig {
            history_capacity: 40,
            ..AGGREGATOR
        };
        let mut agg = CandleAggregator::with_drift(cfg, ScriptedDrift::flat()).unwrap();
        agg.register_symbol("NABIL");
        for i in 0..500 {
            agg.ingest("NABIL", 100.0 + (i % 7) as f64, secs(i * 4)).unwrap();
            assert!(agg.history("NABIL").len() <= 41);
        }
        assert_eq!(agg.closed_len("NABIL"), 40);
    }

    #[test]
    fn test_continuity_alignment_and_invariants_over_random_walk() {
        use rand::Rng;
        let mut rng = StdRng::seed_from_u64(3);
        let mut agg = aggregator();
        let mut t = 0i64;
        let mut price = 100.0f64;
        for _ in 0..2_000 {
            t += rng.gen_range(0..9_000);
            price = (price + rng.gen_range(-1.0..1.0)).max(0.01);
            let out = agg.ingest("NABIL", price, t).unwrap();
            assert!(out.updated.holds_invariants());
        }

        let history = agg.history("NABIL");
        for pair in history.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert!(pair[1].bucket_start_ms > pair[0].bucket_start_ms);
        }
        for c in &history {
            assert_eq!(c.bucket_start_ms % 15_000, 0);
            assert!(c.holds_invariants());
        }
        assert_eq!(history.iter().filter(|c| c.is_open).count(), 1);
    }

    #[test]
    fn test_closed_candle_is_tagged() {
        let mut agg = aggregator();
        // Bearish bucket 100 -> 95, then bullish bucket 94 -> 101 engulfing it
        for (t, p) in [(0, 100.0), (5, 100.5), (10, 94.5), (14, 95.0)] {
            agg.ingest("NABIL", p, secs(t)).unwrap();
        }
        for (t, p) in [(15, 94.0), (18, 93.5), (22, 101.5), (29, 101.0)] {
            agg.ingest("NABIL", p, secs(t)).unwrap();
        }
        let out = agg.ingest("NABIL", 101.2, secs(31)).unwrap();
        let closed = out.closed.expect("second bucket closes");
        // Opened at the carried-forward 95.0, so the body is 95 -> 101
        assert_eq!(closed.candle.open, 95.0);
        let tag = closed.tag.expect("engulfing");
        assert_eq!(tag.kind, PatternKind::BullishEngulfing);
        assert_eq!(tag.polarity, Polarity::Buy);
    }

    #[test]
    fn test_restore_validates_history() {
        let mut agg = aggregator();
        let good = vec![
            Candle::closed(0, 10.0, 11.0, 9.0, 10.5),
            Candle::opening(15_000, 10.5, 10.7, 0.0),
        ];
        agg.restore("NICA", good.clone()).unwrap();
        assert_eq!(agg.history("NICA"), good);

        let misaligned = vec![Candle::closed(1_000, 10.0, 11.0, 9.0, 10.5)];
        assert!(matches!(
            agg.restore("NICA", misaligned),
            Err(AggregatorError::InvalidHistory { .. })
        ));
        let broken = vec![Candle::closed(0, 10.0, 9.0, 9.5, 10.5)];
        assert!(agg.restore("NICA", broken).is_err());
        // Failed restores keep the previous state
        assert_eq!(agg.history("NICA"), good);
    }

    fn ingest_soldiers(agg: &mut CandleAggregator<ScriptedDrift>) -> IngestOutcome {
        // Three rising green buckets; the first opens at its own first tick
        let buckets: [&[f64]; 3] = [
            &[100.0, 102.2, 99.8, 102.0],
            &[104.2, 101.8, 104.0],
            &[106.2, 103.8, 106.0],
        ];
        for (b, prices) in buckets.iter().enumerate() {
            for (i, p) in prices.iter().enumerate() {
                agg.ingest("NABIL", *p, secs(b as i64 * 15 + i as i64)).unwrap();
            }
        }
        agg.ingest("NABIL", 106.1, secs(45)).unwrap()
    }

    #[test]
    fn test_extended_set_tags_closed_candle() {
        let cfg = AggregatorConfig {
            pattern_set: PatternSet::Extended,
            ..AGGREGATOR
        };
        let mut agg = CandleAggregator::with_drift(cfg, ScriptedDrift::flat()).unwrap();
        agg.register_symbol("NABIL");
        let out = ingest_soldiers(&mut agg);

        let closed = out.closed.expect("third bucket closes");
        assert_eq!(
            (closed.candle.open, closed.candle.close),
            (104.0, 106.0)
        );
        let tag = closed.tag.expect("soldiers");
        assert_eq!(tag.kind, PatternKind::ThreeWhiteSoldiers);
        assert_eq!(tag.polarity, Polarity::Buy);

        // Same ticks under the core set stay untagged
        let mut core = aggregator();
        let out = ingest_soldiers(&mut core);
        assert_eq!(out.closed.map(|c| c.tag), Some(None));
    }

    #[test]
    fn test_timestamps_near_the_limits() {
        use crate::utils::TimeUtils;
        let mut agg = aggregator();

        assert!(matches!(
            agg.ingest("NABIL", 100.0, i64::MAX),
            Err(AggregatorError::InvalidTick { .. })
        ));
        // The backfill would start before the accepted range
        assert!(matches!(
            agg.seed("NABIL", 100.0, -TimeUtils::TIMESTAMP_LIMIT_MS),
            Err(AggregatorError::InvalidTick { .. })
        ));
        assert!(agg.history("NABIL").is_empty());

        let top = align_to_interval(TimeUtils::TIMESTAMP_LIMIT_MS, 15_000);
        let seeded = agg.seed("NABIL", 100.0, TimeUtils::TIMESTAMP_LIMIT_MS).unwrap();
        assert_eq!(seeded.last().map(|c| c.bucket_start_ms), Some(top - 15_000));
        let out = agg.ingest("NABIL", 101.0, TimeUtils::TIMESTAMP_LIMIT_MS).unwrap();
        assert_eq!(out.updated.bucket_start_ms, top);

        let far = align_to_interval(i64::MAX, 15_000);
        assert!(matches!(
            agg.restore("NICA", vec![Candle::closed(far, 1.0, 1.0, 1.0, 1.0)]),
            Err(AggregatorError::InvalidHistory { .. })
        ));
    }

    #[test]
    fn test_remove_symbol_and_in_progress() {
        let mut agg = aggregator();
        assert!(agg.in_progress("NABIL").is_none());
        agg.ingest("NABIL", 100.0, secs(1)).unwrap();
        agg.ingest("NABIL", 101.0, secs(2)).unwrap();
        let current = agg.in_progress("NABIL").expect("bucket open");
        assert_eq!((current.open, current.close), (100.0, 101.0));
        assert!(current.is_open);
        assert_eq!(agg.last_close("NABIL"), Some(101.0));

        assert!(agg.remove_symbol("NABIL"));
        assert!(!agg.remove_symbol("NABIL"));
        assert!(agg.history("NABIL").is_empty());
        assert_eq!(
            agg.ingest("NABIL", 100.0, secs(3)).unwrap_err(),
            AggregatorError::UnknownSymbol("NABIL".to_string())
        );
    }
}
