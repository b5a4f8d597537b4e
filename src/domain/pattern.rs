//! Candlestick pattern vocabulary shared by the tagger, the engine and snapshots.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Directional bias attached to a recognised shape.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Polarity {
    #[strum(to_string = "BUY")]
    Buy,
    #[strum(to_string = "SELL")]
    Sell,
    #[strum(to_string = "NEUTRAL")]
    Neutral,
}

/// Which rule family the tagger evaluates.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum PatternSet {
    /// Doji, hammer, shooting star / inverted hammer, bullish and bearish engulfing.
    #[default]
    Core,
    /// Core rules followed by the multi-candle bullish reversal shapes.
    Extended,
}

#[derive(
    Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PatternKind {
    #[strum(to_string = "DOJI")]
    Doji,
    #[strum(to_string = "HAMMER")]
    Hammer,
    #[strum(to_string = "SHOOTING STAR")]
    ShootingStar,
    #[strum(to_string = "INV. HAMMER")]
    InvertedHammer,
    #[strum(to_string = "B. ENGULFING")]
    BullishEngulfing,
    #[strum(to_string = "BR. ENGULFING")]
    BearishEngulfing,
    #[strum(to_string = "MORNING STAR")]
    MorningStar,
    #[strum(to_string = "PIERCING")]
    Piercing,
    #[strum(to_string = "3 SOLDIERS")]
    ThreeWhiteSoldiers,
    #[strum(to_string = "HARAMI")]
    BullishHarami,
    #[strum(to_string = "TWEEZER BOTTOM")]
    TweezerBottom,
    #[strum(to_string = "RISING THREE")]
    RisingThreeMethods,
    #[strum(to_string = "DOJI CONFIRMED")]
    DojiConfirmed,
}

impl PatternKind {
    /// Fixed bias for every shape except the star, whose bias depends on context.
    pub fn default_polarity(&self) -> Polarity {
        match self {
            PatternKind::Doji => Polarity::Neutral,
            PatternKind::ShootingStar | PatternKind::BearishEngulfing => Polarity::Sell,
            _ => Polarity::Buy,
        }
    }

    pub fn is_core(&self) -> bool {
        matches!(
            self,
            PatternKind::Doji
                | PatternKind::Hammer
                | PatternKind::ShootingStar
                | PatternKind::InvertedHammer
                | PatternKind::BullishEngulfing
                | PatternKind::BearishEngulfing
        )
    }
}

/// Annotation for a closed candle. Recomputed from scratch, never edited.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct PatternTag {
    pub kind: PatternKind,
    pub polarity: Polarity,
}

impl PatternTag {
    pub fn new(kind: PatternKind) -> Self {
        PatternTag {
            kind,
            polarity: kind.default_polarity(),
        }
    }
}

impl std::fmt::Display for PatternTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind, self.polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_core_membership() {
        let core: Vec<PatternKind> = PatternKind::iter().filter(|k| k.is_core()).collect();
        assert_eq!(core.len(), 6);
        assert!(!PatternKind::MorningStar.is_core());
    }

    #[test]
    fn test_tag_display() {
        let tag = PatternTag::new(PatternKind::BullishEngulfing);
        assert_eq!(tag.polarity, Polarity::Buy);
        assert_eq!(tag.to_string(), "B. ENGULFING (BUY)");
        assert_eq!(PatternTag::new(PatternKind::Doji).polarity, Polarity::Neutral);
    }
}
