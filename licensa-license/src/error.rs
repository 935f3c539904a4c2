//! Error types for the licensing module.
//!
//! Failed license checks are not errors: they are reported as messages in a
//! [`crate::ValidationReport`]. Errors are reserved for unusable input.

use licensa_crypto::CryptoError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Malformed or missing input (blank license text, missing license file,
    /// missing password or digest).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested language tag is malformed or has no message table.
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// The license text does not match its published digest.
    #[error("license digest does not match license text")]
    IntegrityMismatch,

    /// Decryption or key handling failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a license source failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
