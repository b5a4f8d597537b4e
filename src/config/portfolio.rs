//! Paper-trading account limits

pub struct PortfolioConfig {
    /// Cash every new account starts with (NPR)
    pub initial_balance: f64,
    /// Newest-first transaction log is truncated to this many entries
    pub history_limit: usize,
}

pub const PORTFOLIO: PortfolioConfig = PortfolioConfig {
    initial_balance: 1_000_000.0,
    history_limit: 100,
};
