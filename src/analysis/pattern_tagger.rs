//! Candlestick shape recognition for closed candles.
//!
//! Rules are evaluated in a fixed priority order and the first match wins.
//! Every function here is pure: the same candles always yield the same tag.

use crate::domain::{Candle, PatternKind, PatternSet, PatternTag, Polarity};

/// At most this many preceding candles are consulted.
pub const MAX_LOOKBACK: usize = 4;

const DOJI_BODY_RATIO: f64 = 0.10;
const SHADOW_TO_BODY: f64 = 2.0;
const OPPOSITE_SHADOW_TO_BODY: f64 = 0.5;
const STAR_BODY_RATIO: f64 = 0.3;
const TWEEZER_TOLERANCE: f64 = 0.05;

/// Classify `candle` with the core five-rule taxonomy.
///
/// `preceding` is oldest first; only its last [`MAX_LOOKBACK`] entries matter.
pub fn classify(candle: &Candle, preceding: &[Candle]) -> Option<PatternTag> {
    classify_with(candle, preceding, PatternSet::Core)
}

pub fn classify_with(candle: &Candle, preceding: &[Candle], set: PatternSet) -> Option<PatternTag> {
    let window = &preceding[preceding.len().saturating_sub(MAX_LOOKBACK)..];

    // Flat candles carry no shape information (and would divide by zero)
    let range = candle.range();
    if range.is_nan() || range <= 0.0 {
        return None;
    }

    if let Some(tag) = classify_core(candle, window) {
        return Some(tag);
    }
    match set {
        PatternSet::Core => None,
        PatternSet::Extended => classify_extended(candle, window).map(PatternTag::new),
    }
}

/// Tag every candle of a history (oldest first), each against the candles before it.
/// Returns `(bucket_start_ms, tag)` for tagged candles only.
pub fn classify_series(candles: &[Candle], set: PatternSet) -> Vec<(i64, PatternTag)> {
    candles
        .iter()
        .enumerate()
        .filter_map(|(i, c)| {
            classify_with(c, &candles[..i], set).map(|tag| (c.bucket_start_ms, tag))
        })
        .collect()
}

fn is_doji(c: &Candle) -> bool {
    c.range() > 0.0 && c.body_size() <= DOJI_BODY_RATIO * c.range()
}

/// The window moved down overall: it opened above where it closed.
fn is_downtrend(window: &[Candle]) -> bool {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) => first.open > last.close,
        _ => false,
    }
}

fn classify_core(c: &Candle, window: &[Candle]) -> Option<PatternTag> {
    let body = c.body_size();
    let upper = c.upper_shadow();
    let lower = c.lower_shadow();

    if is_doji(c) {
        return Some(PatternTag::new(PatternKind::Doji));
    }
    if lower >= SHADOW_TO_BODY * body && upper <= OPPOSITE_SHADOW_TO_BODY * body {
        return Some(PatternTag::new(PatternKind::Hammer));
    }
    if upper >= SHADOW_TO_BODY * body && lower <= OPPOSITE_SHADOW_TO_BODY * body {
        // Same geometry, opposite reading: after a decline it hints at a bounce
        return Some(if is_downtrend(window) {
            PatternTag {
                kind: PatternKind::InvertedHammer,
                polarity: Polarity::Buy,
            }
        } else {
            PatternTag {
                kind: PatternKind::ShootingStar,
                polarity: Polarity::Sell,
            }
        });
    }

    let prev = window.last()?;
    if prev.is_bearish() && c.is_bullish() && c.open <= prev.close && c.close >= prev.open {
        return Some(PatternTag::new(PatternKind::BullishEngulfing));
    }
    if prev.is_bullish() && c.is_bearish() && c.open >= prev.close && c.close <= prev.open {
        return Some(PatternTag::new(PatternKind::BearishEngulfing));
    }
    None
}

/// Multi-candle bullish reversals. `window` is oldest first, at most four long.
fn classify_extended(c: &Candle, window: &[Candle]) -> Option<PatternKind> {
    let n = window.len();
    let back = |k: usize| if k <= n { window.get(n - k) } else { None };
    let (c2, c3, c4, c5) = (back(1), back(2), back(3), back(4));

    if let (Some(c2), Some(c3)) = (c2, c3) {
        if c3.is_bearish()
            && c2.body_size() < c3.body_size() * STAR_BODY_RATIO
            && c.is_bullish()
            && c.close > c3.body_midpoint()
        {
            return Some(PatternKind::MorningStar);
        }
    }
    if let Some(c2) = c2 {
        if c2.is_bearish() && c.is_bullish() && c.open < c2.low && c.close > c2.body_midpoint() {
            return Some(PatternKind::Piercing);
        }
    }
    if let (Some(c2), Some(c3)) = (c2, c3) {
        if c3.is_bullish()
            && c2.is_bullish()
            && c.is_bullish()
            && c.close > c2.close
            && c2.close > c3.close
        {
            return Some(PatternKind::ThreeWhiteSoldiers);
        }
    }
    if let Some(c2) = c2 {
        if c2.is_bearish() && c.is_bullish() && c.open > c2.close && c.close < c2.open {
            return Some(PatternKind::BullishHarami);
        }
        if c2.is_bearish()
            && c.is_bullish()
            && (c2.low - c.low).abs() < c.range() * TWEEZER_TOLERANCE
        {
            return Some(PatternKind::TweezerBottom);
        }
    }
    if let (Some(c2), Some(c3), Some(c4), Some(c5)) = (c2, c3, c4, c5) {
        if c5.is_bullish()
            && c4.is_bearish()
            && c3.is_bearish()
            && c2.is_bearish()
            && c.is_bullish()
            && c.close > c5.close
            && c4.low > c5.low
            && c2.low > c5.low
        {
            return Some(PatternKind::RisingThreeMethods);
        }
    }
    if let Some(c2) = c2 {
        if is_doji(c2) && c.is_bullish() && c.close > c2.high {
            return Some(PatternKind::DojiConfirmed);
        }
    }
    None
}
