//! Paynow gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ValidationError;
use crate::adapters::paynow::{setting_keys, PRODUCTION_URL, SANDBOX_URL};
use crate::ports::SettingsProvider;

/// Paynow merchant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaynowConfig {
    /// Paynow API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Paynow signature key (request and notification HMAC)
    #[serde(default)]
    pub signature_key: Option<SecretString>,

    /// Buyer return URL, may contain `{payment_id}`
    #[serde(default)]
    pub continue_url: Option<String>,

    /// Use the sandbox environment
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,

    /// Total timeout for a single API call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_sandbox() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for PaynowConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            signature_key: None,
            continue_url: None,
            sandbox: default_sandbox(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl PaynowConfig {
    /// API base URL for the configured environment
    pub fn base_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_URL
        } else {
            PRODUCTION_URL
        }
    }

    /// Validate Paynow configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = non_empty_secret(&self.api_key)
            .ok_or(ValidationError::MissingRequired("PAYNOW__API_KEY"))?;
        let signature_key = non_empty_secret(&self.signature_key)
            .ok_or(ValidationError::MissingRequired("PAYNOW__SIGNATURE_KEY"))?;

        // Paynow issues both keys as UUIDs
        if Uuid::parse_str(api_key).is_err() {
            return Err(ValidationError::InvalidApiKey);
        }
        if Uuid::parse_str(signature_key).is_err() {
            return Err(ValidationError::InvalidSignatureKey);
        }

        if let Some(url) = &self.continue_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ValidationError::InvalidContinueUrl);
            }
        }

        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl SettingsProvider for PaynowConfig {
    fn get_setting(&self, key: &str) -> Option<String> {
        match key {
            setting_keys::API_KEY => self.api_key.as_ref().map(|s| s.expose_secret().clone()),
            setting_keys::SIGNATURE_KEY => {
                self.signature_key.as_ref().map(|s| s.expose_secret().clone())
            }
            setting_keys::CONTINUE_URL => self.continue_url.clone(),
            setting_keys::SANDBOX => Some(self.sandbox.to_string()),
            _ => None,
        }
    }
}

fn non_empty_secret(secret: &Option<SecretString>) -> Option<&str> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().as_str())
        .filter(|s| !s.trim().is_empty())
}
