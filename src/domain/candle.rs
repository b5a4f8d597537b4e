use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Bullish,
    Bearish,
    Flat,
}

/// One OHLCV bar covering `[bucket_start_ms, bucket_start_ms + interval)`.
///
/// While `is_open` is true the candle is still absorbing ticks. Once closed it
/// is never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub bucket_start_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub is_open: bool,
}

impl Candle {
    /// A closed candle built from explicit prices. Mostly used by backfill and fixtures.
    pub fn closed(bucket_start_ms: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Candle {
            bucket_start_ms,
            open,
            high,
            low,
            close,
            volume: 0.0,
            is_open: false,
        }
    }

    /// Start a new in-progress bucket. `open` is the carried-forward close of the
    /// previous bucket (or the first tick), `price` is the tick that opened it.
    pub fn opening(bucket_start_ms: i64, open: f64, price: f64, volume: f64) -> Self {
        Candle {
            bucket_start_ms,
            open,
            high: open.max(price),
            low: open.min(price),
            close: price,
            volume,
            is_open: true,
        }
    }

    /// Fold a tick into this (in-progress) candle.
    pub fn absorb(&mut self, price: f64, volume: f64) {
        debug_assert!(self.is_open, "closed candles are immutable");
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        self.volume += volume;
    }

    pub fn close_out(&mut self) {
        self.is_open = false;
    }

    pub fn get_type(&self) -> CandleType {
        if self.close > self.open {
            CandleType::Bullish
        } else if self.close < self.open {
            CandleType::Bearish
        } else {
            CandleType::Flat
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.get_type() == CandleType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.get_type() == CandleType::Bearish
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        (self.open.min(self.close), self.open.max(self.close))
    }

    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn body_midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.body_range().1
    }

    pub fn lower_shadow(&self) -> f64 {
        self.body_range().0 - self.low
    }

    /// `low <= min(open, close) <= max(open, close) <= high`, all finite.
    pub fn holds_invariants(&self) -> bool {
        let (body_low, body_high) = self.body_range();
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
            && self.low <= body_low
            && body_high <= self.high
            && self.volume >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_covers_carry_forward_open() {
        let c = Candle::opening(15_000, 99.0, 101.0, 0.0);
        assert_eq!(c.open, 99.0);
        assert_eq!(c.close, 101.0);
        assert_eq!(c.high, 101.0);
        assert_eq!(c.low, 99.0);
        assert!(c.is_open);
        assert!(c.holds_invariants());
    }

    #[test]
    fn test_absorb_tracks_extremes() {
        let mut c = Candle::opening(0, 100.0, 100.0, 1.0);
        c.absorb(102.0, 2.0);
        c.absorb(99.0, 0.5);
        assert_eq!((c.open, c.high, c.low, c.close), (100.0, 102.0, 99.0, 99.0));
        assert!((c.volume - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_shadows_and_body() {
        let c = Candle::closed(0, 10.0, 12.0, 7.0, 11.0);
        assert_eq!(c.body_size(), 1.0);
        assert_eq!(c.upper_shadow(), 1.0);
        assert_eq!(c.lower_shadow(), 3.0);
        assert_eq!(c.get_type(), CandleType::Bullish);
    }

    #[test]
    fn test_invariants_reject_bad_wicks() {
        let c = Candle::closed(0, 100.0, 100.6, 100.55, 100.5);
        assert!(!c.holds_invariants());
        let nan = Candle::closed(0, f64::NAN, 1.0, 1.0, 1.0);
        assert!(!nan.holds_invariants());
    }
}
