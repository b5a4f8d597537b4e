//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit one line per ingested tick (very chatty with a full watchlist).
pub const PRINT_TICKS: bool = false;

/// Emit a line every time a bucket closes, including its pattern tag.
pub const PRINT_CANDLE_CLOSES: bool = true;

/// Emit a line when an out-of-order tick is absorbed into the current bucket.
pub const PRINT_CLOCK_REGRESSIONS: bool = true;

/// Emit portfolio fills and rejections.
pub const PRINT_TRADES: bool = true;

/// Emit snapshot save/load details.
pub const PRINT_SERDE: bool = false;
