//! File persistence and serialization configuration

/// Where market snapshots live on disk
pub struct SnapshotSettings {
    pub directory: &'static str,
    pub filename_without_ext: &'static str,
    /// Current version of the snapshot serialization format
    pub version: f64,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub snapshot: SnapshotSettings,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    snapshot: SnapshotSettings {
        directory: "market_data",
        filename_without_ext: "snapshot",
        version: 1.0,
    },
};

use crate::utils::TimeUtils;

/// Generate interval-specific snapshot filename
/// Example: "snapshot_15s_v1.bin"
pub fn snapshot_filename(interval_ms: i64) -> String {
    let interval_str = TimeUtils::interval_to_string(interval_ms);
    format!(
        "{}_{}_v{}.bin",
        PERSISTENCE.snapshot.filename_without_ext, interval_str, PERSISTENCE.snapshot.version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_filename() {
        assert_eq!(snapshot_filename(15_000), "snapshot_15s_v1.bin");
    }
}
