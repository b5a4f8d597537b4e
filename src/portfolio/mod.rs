// Paper trading
pub mod ledger;

// Re-export commonly used types
pub use ledger::{Holding, Portfolio, TradeError, TradeSide, Transaction};
