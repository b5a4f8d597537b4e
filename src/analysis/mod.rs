// Pattern recognition over candle histories
pub mod pattern_tagger;

use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::{Candle, PatternSet, PatternTag};

// Re-export commonly used items
pub use pattern_tagger::{MAX_LOOKBACK, classify, classify_series, classify_with};

/// Tag every symbol's closed history in parallel.
/// Symbols with no tagged candles are left out of the result.
pub fn annotate_all(
    histories: &HashMap<String, Vec<Candle>>,
    set: PatternSet,
) -> HashMap<String, Vec<(i64, PatternTag)>> {
    histories
        .par_iter()
        .filter_map(|(symbol, candles)| {
            let closed: Vec<Candle> = candles.iter().filter(|c| !c.is_open).cloned().collect();
            let tags = classify_series(&closed, set);
            (!tags.is_empty()).then(|| (symbol.clone(), tags))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternKind;

    #[test]
    fn test_annotate_all_skips_open_and_untagged() {
        let mut histories = HashMap::new();
        histories.insert(
            "NABIL".to_string(),
            vec![
                Candle::closed(0, 100.0, 100.5, 94.5, 95.0),
                Candle::closed(15_000, 94.0, 101.5, 93.5, 101.0),
                // in progress, a doji if it were closed
                Candle::opening(30_000, 101.0, 101.0, 0.0),
            ],
        );
        histories.insert(
            "NICA".to_string(),
            vec![Candle::closed(0, 100.0, 101.0, 100.0, 101.0)],
        );

        let tagged = annotate_all(&histories, PatternSet::Core);
        assert_eq!(tagged.len(), 1);
        let nabil = &tagged["NABIL"];
        assert_eq!(nabil.len(), 1);
        assert_eq!(nabil[0].1.kind, PatternKind::BullishEngulfing);
    }
}
