//! Random-walk market simulator knobs

use crate::simulation::SimulationError;

/// Configuration of the scripted price drift
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Period between simulator steps (one tick per symbol per step)
    pub tick_period_ms: i64,
    /// Absolute price steps, one chosen uniformly per tick
    pub step_sizes: [f64; 3],
    /// Probability that a step moves the price up
    pub up_probability: f64,
    /// Prices never drift below this floor
    pub price_floor: f64,
    /// Volume added per tick is drawn from `0..max_volume_increment`
    pub max_volume_increment: u32,
}

pub const SIMULATION: SimulationConfig = SimulationConfig {
    tick_period_ms: 3_000,
    step_sizes: [1.0, 0.1, 0.01],
    up_probability: 0.51,
    price_floor: 0.01,
    max_volume_increment: 5,
};

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.tick_period_ms <= 0 {
            return Err(SimulationError::InvalidConfig(format!(
                "tick_period_ms {} must be positive",
                self.tick_period_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.up_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "up_probability {} must lie in [0, 1]",
                self.up_probability
            )));
        }
        if !self.price_floor.is_finite() || self.price_floor <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "price_floor {} must be a positive finite number",
                self.price_floor
            )));
        }
        if let Some(step) = self
            .step_sizes
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(SimulationError::InvalidConfig(format!(
                "step size {step} must be a positive finite number"
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SIMULATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SIMULATION.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_probability_and_steps() {
        for p in [-0.1, 1.5, f64::NAN] {
            let cfg = SimulationConfig {
                up_probability: p,
                ..SIMULATION
            };
            assert!(matches!(cfg.validate(), Err(SimulationError::InvalidConfig(_))), "{p}");
        }
        let cfg = SimulationConfig {
            step_sizes: [1.0, 0.0, 0.01],
            ..SIMULATION
        };
        assert!(cfg.validate().is_err());
        let cfg = SimulationConfig {
            price_floor: 0.0,
            ..SIMULATION
        };
        assert!(cfg.validate().is_err());
    }
}
