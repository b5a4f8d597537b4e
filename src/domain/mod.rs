// Domain types and value objects
pub mod candle;
pub mod pattern;
pub mod quote;
pub mod tick;

// Re-export commonly used types
pub use candle::{Candle, CandleType};
pub use pattern::{PatternKind, PatternSet, PatternTag, Polarity};
pub use quote::Quote;
pub use tick::Tick;
