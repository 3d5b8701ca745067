//! Simulation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants;
use crate::error::{ConfigError, ConfigResult};

/// Tunables for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Domain width in cells
    pub width: usize,
    /// Domain height in cells
    pub height: usize,
    /// Simulation ticks per second
    pub sim_rate: u32,
    /// Grid publications per second (at most `sim_rate`)
    pub publish_rate: u32,
    /// Downward acceleration in px/s²
    pub gravity: f32,
    /// Vertical speed cap in px/s
    pub max_velocity: f32,
    /// Live particle ceiling
    pub max_particles: usize,
    /// Capacity of the pointer event queue
    pub event_queue_capacity: usize,
    /// Ticks between store compactions (0 disables)
    pub compact_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: constants::WIDTH,
            height: constants::HEIGHT,
            sim_rate: constants::SIM_RATE,
            publish_rate: constants::PUBLISH_RATE,
            gravity: constants::GRAVITY,
            max_velocity: constants::MAX_VELOCITY,
            max_particles: constants::MAX_SAND,
            event_queue_capacity: constants::EVENT_QUEUE_CAPACITY,
            compact_interval_ticks: constants::COMPACT_INTERVAL_TICKS,
        }
    }
}

impl SimConfig {
    /// Seconds per simulation tick
    pub fn dt(&self) -> f32 {
        1.0 / self.sim_rate as f32
    }

    /// Wall-clock period of one simulation tick
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.sim_rate.max(1)
    }

    /// Wall-clock period between grid publications
    pub fn publish_period(&self) -> Duration {
        Duration::from_secs(1) / self.publish_rate.max(1)
    }

    /// Number of cells in the domain
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Check that the configuration describes a runnable simulation
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyDomain {
                width: self.width,
                height: self.height,
            });
        }
        if self.sim_rate == 0 {
            return Err(ConfigError::ZeroRate { name: "simulation" });
        }
        if self.publish_rate == 0 {
            return Err(ConfigError::ZeroRate { name: "publish" });
        }
        if self.publish_rate > self.sim_rate {
            return Err(ConfigError::PublishFasterThanSimulation {
                publish_rate: self.publish_rate,
                sim_rate: self.sim_rate,
            });
        }
        if !(self.gravity > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "gravity",
                value: self.gravity,
            });
        }
        if !(self.max_velocity > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "max_velocity",
                value: self.max_velocity,
            });
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }

    /// Smaller domain with the default physics, handy for tests and demos
    pub fn with_domain(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            max_particles: width * height / 2,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = SimConfig::default();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 800);
        assert_eq!(config.gravity, 490.0);
        assert_eq!(config.max_velocity, 256.0);
        assert_eq!(config.max_particles, 320_000);
        assert!((config.dt() - 1.0 / 64.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_publish_is_slower_than_simulation() {
        let config = SimConfig::default();
        assert!(config.publish_period() > config.tick_period());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SimConfig {
            width: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyDomain { .. })
        ));

        let config = SimConfig {
            gravity: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "gravity", .. })
        ));

        let config = SimConfig {
            publish_rate: 120,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PublishFasterThanSimulation {
                publish_rate: 120,
                sim_rate: 64
            })
        );

        let config = SimConfig {
            event_queue_capacity: 0,
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueueCapacity));
    }

    #[test]
    fn test_with_domain_scales_ceiling() {
        let config = SimConfig::with_domain(10, 20);
        assert_eq!(config.area(), 200);
        assert_eq!(config.max_particles, 100);
        assert_eq!(config.gravity, SimConfig::default().gravity);
    }
}
