use serde::{Deserialize, Serialize};

/// Session-level watchlist row for one symbol: last traded price plus the
/// running session statistics shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub ltp: f64,
    pub session_open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Quote {
            symbol: symbol.into(),
            ltp: price,
            session_open: price,
            high: price,
            low: price,
            volume: 0.0,
        }
    }

    /// Record a new last traded price.
    pub fn apply(&mut self, price: f64, volume_increment: f64) {
        self.ltp = price;
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.volume += volume_increment;
    }

    /// Restart the session at a last-known price (e.g. restored from a snapshot).
    pub fn reset_session(&mut self, price: f64) {
        self.ltp = price;
        self.session_open = price;
        self.high = price;
        self.low = price;
        self.volume = 0.0;
    }

    /// Percent move since session open; 0 when the open is unknown.
    pub fn change_pct(&self) -> f64 {
        if self.session_open == 0.0 {
            0.0
        } else {
            (self.ltp - self.session_open) / self.session_open * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_pct() {
        let mut q = Quote::new("NABIL", 500.0);
        q.apply(505.0, 2.0);
        assert!((q.change_pct() - 1.0).abs() < 1e-9);
        assert_eq!(q.high, 505.0);
        assert_eq!(q.volume, 2.0);
    }

    #[test]
    fn test_reset_session_starts_flat() {
        let mut q = Quote::new("NABIL", 500.0);
        q.apply(480.0, 4.0);
        q.apply(530.0, 1.0);
        q.reset_session(530.0);
        assert_eq!((q.session_open, q.high, q.low, q.ltp), (530.0, 530.0, 530.0, 530.0));
        assert_eq!(q.volume, 0.0);
        assert_eq!(q.change_pct(), 0.0);
    }

    #[test]
    fn test_zero_open_has_no_change() {
        let mut q = Quote::new("NIBL", 0.0);
        q.ltp = 10.0;
        assert_eq!(q.change_pct(), 0.0);
    }
}
