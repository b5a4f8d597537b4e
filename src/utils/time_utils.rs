use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_5_S: i64 = Self::MS_IN_S * 5;
    pub const MS_IN_15_S: i64 = Self::MS_IN_S * 15;
    pub const MS_IN_30_S: i64 = Self::MS_IN_S * 30;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_MIN * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_MIN * 15;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    /// Accepted timestamps lie in `[-LIMIT, LIMIT]` (2^53 ms, about 285k years),
    /// which leaves room for bucket arithmetic with any `u32` second width.
    pub const TIMESTAMP_LIMIT_MS: i64 = 1 << 53;

    /// Convert a bucket width in milliseconds to a chart-style shorthand (e.g. `15s`, `1m`).
    pub fn interval_to_string(interval_ms: i64) -> &'static str {
        match interval_ms {
            Self::MS_IN_S => "1s",
            Self::MS_IN_5_S => "5s",
            Self::MS_IN_15_S => "15s",
            Self::MS_IN_30_S => "30s",
            Self::MS_IN_MIN => "1m",
            Self::MS_IN_5_MIN => "5m",
            Self::MS_IN_15_MIN => "15m",
            Self::MS_IN_H => "1h",
            Self::MS_IN_D => "1d",
            _ => "custom",
        }
    }
}

/// Start of the bucket containing `timestamp_ms`.
///
/// Uses floor division so timestamps before the epoch still land on an
/// aligned boundary at or below themselves.
pub fn align_to_interval(timestamp_ms: i64, interval_ms: i64) -> i64 {
    debug_assert!(interval_ms > 0, "interval must be positive");
    timestamp_ms.div_euclid(interval_ms) * interval_ms
}

pub fn is_aligned(timestamp_ms: i64, interval_ms: i64) -> bool {
    interval_ms > 0 && timestamp_ms.rem_euclid(interval_ms) == 0
}

pub fn in_timestamp_range(timestamp_ms: i64) -> bool {
    (-TimeUtils::TIMESTAMP_LIMIT_MS..=TimeUtils::TIMESTAMP_LIMIT_MS).contains(&timestamp_ms)
}

pub fn now_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}
