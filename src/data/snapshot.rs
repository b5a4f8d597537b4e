use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{PERSISTENCE, debug, snapshot_filename};
use crate::domain::{Candle, Quote};

/// Everything needed to resume a market: last known quotes and candle histories.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub version: f64,
    pub timestamp_ms: i64,
    pub interval_ms: i64,
    pub quotes: BTreeMap<String, Quote>,
    pub histories: BTreeMap<String, Vec<Candle>>,
}

impl MarketSnapshot {
    pub fn new(
        interval_ms: i64,
        quotes: BTreeMap<String, Quote>,
        histories: BTreeMap<String, Vec<Candle>>,
    ) -> Self {
        Self {
            version: PERSISTENCE.snapshot.version,
            timestamp_ms: Utc::now().timestamp_millis(),
            interval_ms,
            quotes,
            histories,
        }
    }

    pub fn last_price(&self, symbol: &str) -> Option<f64> {
        self.quotes.get(symbol).map(|q| q.ltp)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).context(format!("Failed to open snapshot: {:?}", path))?;
        let mut reader = BufReader::new(file);
        let snapshot: Self = bincode::deserialize_from(&mut reader)
            .context(format!("Failed to deserialize snapshot: {:?}", path))?;
        if snapshot.version != PERSISTENCE.snapshot.version {
            bail!(
                "Snapshot {:?} has version {}, expected {}",
                path,
                snapshot.version,
                PERSISTENCE.snapshot.version
            );
        }
        if debug::PRINT_SERDE {
            log::info!(
                "Loaded snapshot {:?}: {} quotes, {} histories",
                path,
                snapshot.quotes.len(),
                snapshot.histories.len()
            );
        }
        Ok(snapshot)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize snapshot to: {}", path.display()))?;
        if debug::PRINT_SERDE {
            log::info!("Saved snapshot to {}", path.display());
        }
        Ok(())
    }

    /// Human-readable copy for inspection. Not read back.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context(format!("Failed to write JSON snapshot to: {}", path.display()))
    }

    pub fn default_path(interval_ms: i64) -> PathBuf {
        PathBuf::from(PERSISTENCE.snapshot.directory).join(snapshot_filename(interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MarketSnapshot {
        let mut quotes = BTreeMap::new();
        quotes.insert("NABIL".to_string(), Quote::new("NABIL", 498.6));
        let mut histories = BTreeMap::new();
        histories.insert(
            "NABIL".to_string(),
            vec![
                Candle::closed(0, 498.0, 499.0, 497.5, 498.6),
                Candle::opening(15_000, 498.6, 498.9, 3.0),
            ],
        );
        MarketSnapshot::new(15_000, quotes, histories)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("nexora-snapshot-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("snap.bin");
        let snap = sample();
        snap.save_to_path(&path).unwrap();
        let loaded = MarketSnapshot::load_from_path(&path).unwrap();
        assert_eq!(loaded, snap);
        assert_eq!(loaded.last_price("NABIL"), Some(498.6));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = MarketSnapshot::load_from_path(&temp_path("nope.bin")).unwrap_err();
        assert!(err.to_string().contains("Failed to open snapshot"));
    }

    #[test]
    fn test_json_export() {
        let path = temp_path("snap.json");
        sample().export_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["interval_ms"], 15_000);
        assert_eq!(value["quotes"]["NABIL"]["ltp"], 498.6);
        let _ = std::fs::remove_file(&path);
    }
}
