use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    #[strum(to_string = "OPEN")]
    Open,
    #[strum(to_string = "CLOSED")]
    Closed,
}

/// Open/closed flag for the trading day. Nothing trades or ticks while closed.
#[derive(Debug, Clone, Default)]
pub struct MarketSession {
    state: SessionState,
}

impl MarketSession {
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Flip the session and return the new state.
    pub fn toggle(&mut self) -> SessionState {
        self.state = match self.state {
            SessionState::Open => SessionState::Closed,
            SessionState::Closed => SessionState::Open,
        };
        log::info!("Market is now {}", self.state);
        self.state
    }
}
