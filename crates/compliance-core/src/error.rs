//! Error types for compliance claim signing

use thiserror::Error;

/// Result type alias using ComplianceError
pub type Result<T> = std::result::Result<T, ComplianceError>;

/// Errors that can occur while building or checking signed claims
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// Canonical payload could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Hex input was not valid hexadecimal
    #[error("Invalid {field} encoding: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    /// Decoded material had the wrong size
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Unknown compliance status string
    #[error("Unknown compliance status: {0}")]
    UnknownStatus(String),

    /// Cryptographic error
    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl From<ed25519_dalek::SignatureError> for ComplianceError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        ComplianceError::Crypto(err.to_string())
    }
}

impl From<serde_json::Error> for ComplianceError {
    fn from(err: serde_json::Error) -> Self {
        ComplianceError::Serialization(err.to_string())
    }
}
