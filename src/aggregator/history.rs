use std::collections::VecDeque;

use crate::domain::Candle;
use crate::utils::align_to_interval;

/// What a single tick did to a symbol's series.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Applied {
    pub updated: Candle,
    pub closed: Option<Candle>,
    pub clock_regressed: bool,
}

/// Per-symbol state: a bounded queue of closed candles plus the bucket in progress.
#[derive(Debug, Clone)]
pub(crate) struct SymbolSeries {
    capacity: usize,
    closed: VecDeque<Candle>,
    current: Option<Candle>,
    last_seen_ms: Option<i64>,
}

impl SymbolSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            closed: VecDeque::with_capacity(capacity),
            current: None,
            last_seen_ms: None,
        }
    }

    /// Replace everything with an already-validated history (oldest first).
    /// Only the newest `capacity` closed candles are kept.
    pub fn replace(&mut self, closed: Vec<Candle>, current: Option<Candle>) {
        self.closed.clear();
        let skip = closed.len().saturating_sub(self.capacity);
        self.closed.extend(closed.into_iter().skip(skip));
        self.last_seen_ms = current.as_ref().map(|c| c.bucket_start_ms);
        self.current = current;
    }

    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    pub fn closed(&self) -> &VecDeque<Candle> {
        &self.closed
    }

    pub fn last_close(&self) -> Option<f64> {
        self.current
            .as_ref()
            .or_else(|| self.closed.back())
            .map(|c| c.close)
    }

    /// Up to `n` closed candles immediately before the newest closed one, oldest first.
    pub fn preceding_last_closed(&self, n: usize) -> Vec<Candle> {
        let len = self.closed.len();
        if len < 2 {
            return Vec::new();
        }
        let end = len - 1;
        let start = end.saturating_sub(n);
        self.closed.range(start..end).cloned().collect()
    }

    /// Closed candles followed by the in-progress candle.
    pub fn snapshot(&self) -> Vec<Candle> {
        self.closed
            .iter()
            .chain(self.current.iter())
            .cloned()
            .collect()
    }

    fn push_closed(&mut self, candle: Candle) {
        self.closed.push_back(candle);
        while self.closed.len() > self.capacity {
            self.closed.pop_front();
        }
    }

    /// Fold one validated tick into the series.
    ///
    /// Buckets never move backward: a tick whose bucket precedes the one in
    /// progress is treated as part of it.
    pub fn apply(&mut self, price: f64, volume: f64, timestamp_ms: i64, interval_ms: i64) -> Applied {
        let bucket = align_to_interval(timestamp_ms, interval_ms);
        let mut clock_regressed = self.last_seen_ms.is_some_and(|last| timestamp_ms < last);
        self.last_seen_ms = Some(
            self.last_seen_ms
                .map_or(timestamp_ms, |last| last.max(timestamp_ms)),
        );

        if let Some(cur) = self.current.as_mut() {
            if bucket <= cur.bucket_start_ms {
                clock_regressed |= bucket < cur.bucket_start_ms;
                cur.absorb(price, volume);
                return Applied {
                    updated: cur.clone(),
                    closed: None,
                    clock_regressed,
                };
            }
        }

        if let Some(mut finished) = self.current.take() {
            finished.close_out();
            let next = Candle::opening(bucket, finished.close, price, volume);
            self.current = Some(next.clone());
            self.push_closed(finished.clone());
            return Applied {
                updated: next,
                closed: Some(finished),
                clock_regressed,
            };
        }

        // No live bucket yet: either a brand new symbol or a seeded/restored history
        let (bucket, behind) = match self.closed.back() {
            Some(last) if bucket <= last.bucket_start_ms => (last.bucket_start_ms + interval_ms, true),
            _ => (bucket, false),
        };
        let open = self.closed.back().map_or(price, |c| c.close);
        let next = Candle::opening(bucket, open, price, volume);
        self.current = Some(next.clone());
        Applied {
            updated: next,
            closed: None,
            clock_regressed: clock_regressed || behind,
        }
    }
}
