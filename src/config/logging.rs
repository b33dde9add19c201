//! Logging configuration

use serde::Deserialize;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use super::error::{ConfigError, ValidationError};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate's events (`RUST_LOG` overrides)
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let level = self.level.to_ascii_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            return Err(ValidationError::InvalidLogLevel(self.level.clone()));
        }
        Ok(())
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn directive(&self) -> String {
        format!("paynow_gateway={},info", self.level.to_ascii_lowercase())
    }

    /// Install the global subscriber.
    ///
    /// Fails instead of panicking when a subscriber is already set.
    pub fn init(&self) -> Result<(), ConfigError> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()));
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init(),
        }
        .map_err(|e| ConfigError::TelemetryInit(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let config = LoggingConfig {
            level: "DEBUG".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.directive(), "paynow_gateway=debug,info");
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_second_init_fails_without_panicking() {
        let config = LoggingConfig::default();
        let _ = config.init();
        assert!(matches!(config.init(), Err(ConfigError::TelemetryInit(_))));
    }
}
