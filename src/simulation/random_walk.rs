use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SimulationConfig;
use crate::domain::Tick;

use super::error::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimDirection {
    Up,
    Down,
}

impl fmt::Display for SimDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimDirection::Up => write!(f, "▲"),
            SimDirection::Down => write!(f, "▼"),
        }
    }
}

impl SimDirection {
    pub fn sign(&self) -> f64 {
        match self {
            SimDirection::Up => 1.0,
            SimDirection::Down => -1.0,
        }
    }
}

/// Absolute price increments the walk chooses between
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimStepSize {
    Rupee,
    Paisa10,
    Paisa1,
}

impl SimStepSize {
    pub const ALL: [SimStepSize; 3] = [SimStepSize::Rupee, SimStepSize::Paisa10, SimStepSize::Paisa1];

    /// Index into `SimulationConfig::step_sizes`
    fn index(&self) -> usize {
        match self {
            SimStepSize::Rupee => 0,
            SimStepSize::Paisa10 => 1,
            SimStepSize::Paisa1 => 2,
        }
    }

    pub fn amount(&self, config: &SimulationConfig) -> f64 {
        config.step_sizes[self.index()]
    }
}

/// Round to whole paisa.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Scripted random walk that stands in for a live exchange feed.
pub struct RandomWalk<R: Rng = StdRng> {
    config: SimulationConfig,
    rng: R,
}

impl RandomWalk<StdRng> {
    pub fn seeded(config: SimulationConfig, seed: u64) -> Result<Self, SimulationError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::new(config, StdRng::from_entropy())
    }
}

impl<R: Rng> RandomWalk<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn next_direction(&mut self) -> SimDirection {
        if self.rng.gen_bool(self.config.up_probability) {
            SimDirection::Up
        } else {
            SimDirection::Down
        }
    }

    pub fn next_step(&mut self) -> SimStepSize {
        SimStepSize::ALL[self.rng.gen_range(0..SimStepSize::ALL.len())]
    }

    /// Move `price` by one random step, floored and rounded to 2 dp.
    pub fn next_price(&mut self, price: f64) -> f64 {
        let direction = self.next_direction();
        let step = self.next_step().amount(&self.config);
        round_price((price + direction.sign() * step).max(self.config.price_floor))
    }

    pub fn next_volume(&mut self) -> f64 {
        if self.config.max_volume_increment == 0 {
            return 0.0;
        }
        self.rng.gen_range(0..self.config.max_volume_increment) as f64
    }

    /// One tick for `symbol`, continuing from `last_price`.
    pub fn next_tick(&mut self, symbol: &str, last_price: f64, now_ms: i64) -> Tick {
        let price = self.next_price(last_price);
        let volume = self.next_volume();
        Tick::new(symbol, price, now_ms).with_volume(volume)
    }
}
