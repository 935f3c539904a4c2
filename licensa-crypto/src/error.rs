//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
///
/// Tag mismatches and padding corruption both surface as
/// [`CryptoError::AuthenticationFailed`]; callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Malformed or missing input (short password, empty plaintext, truncated message).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key byte length does not match the configured key size.
    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// The message failed authentication (wrong key or tampered data).
    #[error("authentication failed (wrong key or tampered data)")]
    AuthenticationFailed,
}
