//! Validation failures for gateway values.

use thiserror::Error;

/// A value the gateway would reject before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{field}' must not be empty")]
    Empty { field: String },

    #[error("'{field}' is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::Empty {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field } | ValidationError::Invalid { field, .. } => field,
        }
    }
}

/// Rejects empty identifiers before they are interpolated into request paths.
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    Ok(value)
}
