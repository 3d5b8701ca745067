//! Error types for the simulation core
//!
//! The tick itself never fails; only configuration is validated.

use thiserror::Error;

/// Rejected simulation configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("domain must be at least 1x1 cells, got {width}x{height}")]
    EmptyDomain { width: usize, height: usize },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} rate must be at least 1 per second")]
    ZeroRate { name: &'static str },

    #[error("publish rate {publish_rate}/s exceeds simulation rate {sim_rate}/s")]
    PublishFasterThanSimulation { publish_rate: u32, sim_rate: u32 },

    #[error("event queue capacity must be at least 1")]
    ZeroQueueCapacity,
}

/// Convenience alias for configuration results
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure to start the simulation thread
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn simulation thread: {0}")]
    Thread(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_field() {
        let err = ConfigError::NonPositive {
            name: "gravity",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "gravity must be positive, got -1");

        let err = ConfigError::EmptyDomain {
            width: 0,
            height: 10,
        };
        assert!(err.to_string().contains("0x10"));
    }

    #[test]
    fn test_sim_error_wraps_config_error() {
        let err: SimError = ConfigError::ZeroQueueCapacity.into();
        assert_eq!(
            err.to_string(),
            "invalid configuration: event queue capacity must be at least 1"
        );
    }
}
