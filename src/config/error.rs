//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Logging initialization failed: {0}")]
    TelemetryInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid Paynow API key format (expected UUID)")]
    InvalidApiKey,

    #[error("Invalid Paynow signature key format (expected UUID)")]
    InvalidSignatureKey,

    #[error("Continue URL must be an http(s) URL")]
    InvalidContinueUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Unknown log level: {0}")]
    InvalidLogLevel(String),
}
