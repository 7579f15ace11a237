//! Error types for activation code generation.

use crate::form::{Field, FieldErrors};
use thiserror::Error;

/// Errors produced while validating input or deriving a code.
#[derive(Debug, Error)]
pub enum KeygenError {
    /// One or more form fields failed validation.
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    /// A single typed input was rejected.
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// The offending field.
        field: Field,
        /// Human-readable reason.
        message: String,
    },

    /// A field name that the form does not know.
    #[error("unknown form field '{0}'")]
    UnknownField(String),

    /// The digest backend failed or produced an unusable value.
    #[error("activation code derivation failed: {0}")]
    DerivationFailed(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KeygenError {
    /// Returns the per-field errors carried by a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for keygen operations.
pub type KeygenResult<T> = Result<T, KeygenError>;
