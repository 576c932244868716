//! Erosion configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters for a droplet erosion campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErosionConfig {
    /// Number of droplets simulated per campaign.
    pub particle_count: u32,
    /// Step budget of each droplet.
    pub iterations_per_particle: u32,
    /// Floor of the sediment capacity, keeps flat ground from stalling (0-1).
    pub min_sediment_capacity: f32,
    /// Largest height change a single step may erode or deposit.
    pub max_step_change: f32,
    /// Converts height drop into kinetic energy.
    pub gravity: f32,
    /// Speed of a freshly spawned droplet.
    pub initial_speed: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            iterations_per_particle: 200,
            min_sediment_capacity: 0.01,
            max_step_change: 0.001,
            gravity: 4.0,
            initial_speed: 1.0,
        }
    }
}

impl ErosionConfig {
    /// Default tunables with an explicit particle budget.
    pub fn with_particles(particle_count: u32, iterations_per_particle: u32) -> Self {
        Self {
            particle_count,
            iterations_per_particle,
            ..Default::default()
        }
    }

    /// Checks every tunable before a campaign touches the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations_per_particle == 0 {
            return Err(ConfigError::NoIterations);
        }
        if !(0.0..=1.0).contains(&self.min_sediment_capacity) {
            return Err(ConfigError::InvalidMinCapacity(self.min_sediment_capacity));
        }
        for (name, value) in [
            ("max_step_change", self.max_step_change),
            ("gravity", self.gravity),
            ("initial_speed", self.initial_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter(name, value));
            }
        }
        Ok(())
    }
}
