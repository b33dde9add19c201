//! Runtime configuration.
//!
//! Everything is read from the environment (plus an optional `.env` file)
//! under the `PAYNOW_GATEWAY` prefix, with `__` between nesting levels.
//!
//! ```no_run
//! use paynow_gateway::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("Paynow API at {}", config.paynow.base_url());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod logging;
mod paynow;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use paynow::PaynowConfig;

use serde::Deserialize;

/// Settings for the gateway and its logging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paynow: PaynowConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then `PAYNOW_GATEWAY__*` variables.
    ///
    /// `PAYNOW_GATEWAY__PAYNOW__API_KEY` lands in `paynow.api_key`,
    /// `PAYNOW_GATEWAY__LOGGING__FORMAT` in `logging.format`. Unset sections
    /// take their defaults; call [`AppConfig::validate`] before use.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYNOW_GATEWAY")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Checks every section, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.paynow.validate()?;
        self.logging.validate()
    }
}
