// Snapshot persistence
pub mod snapshot;

// Re-export commonly used types
pub use snapshot::MarketSnapshot;
