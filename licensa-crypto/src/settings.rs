//! Encryption settings.
//!
//! A process-wide [`EncryptionSettings`] value is configured once at startup
//! and read as an immutable snapshot by every operation that does not receive
//! explicit settings.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, PoisonError, RwLock};

/// Pseudorandom function used inside PBKDF2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KdfHash {
    /// HMAC-SHA-256.
    #[default]
    Sha256,
    /// HMAC-SHA-1, for documents written by legacy issuers.
    Sha1,
}

/// Sizes and work factors used by the cipher and key derivation.
///
/// All sizes are expressed in bits, matching how they are usually quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionSettings {
    /// AES key size in bits (128, 192 or 256).
    pub aes_key_size: usize,
    /// AES block size in bits. Only 128 is valid for AES.
    pub aes_block_size: usize,
    /// Size of each PBKDF2 salt in bits.
    pub salt_size: usize,
    /// PBKDF2 iteration count.
    pub key_derivation_iterations: u32,
    /// Minimum password length in characters.
    pub min_password_length: usize,
    /// PBKDF2 pseudorandom function.
    pub kdf_hash: KdfHash,
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            aes_key_size: 256,
            aes_block_size: 128,
            salt_size: 64,
            key_derivation_iterations: 10_000,
            min_password_length: 12,
            kdf_hash: KdfHash::Sha256,
        }
    }
}

impl EncryptionSettings {
    /// Key size in bytes.
    #[must_use]
    pub const fn aes_key_byte_size(&self) -> usize {
        self.aes_key_size / 8
    }

    /// Block size (and IV length) in bytes.
    #[must_use]
    pub const fn aes_block_byte_size(&self) -> usize {
        self.aes_block_size / 8
    }

    /// Salt size in bytes.
    #[must_use]
    pub const fn salt_byte_size(&self) -> usize {
        self.salt_size / 8
    }

    /// Checks that the settings describe a usable AES/PBKDF2 configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidArgument`] naming the offending field.
    pub fn validate(&self) -> CryptoResult<()> {
        if !matches!(self.aes_key_size, 128 | 192 | 256) {
            return Err(CryptoError::InvalidArgument(format!(
                "aes_key_size must be 128, 192 or 256 bits, got {}",
                self.aes_key_size
            )));
        }
        if self.aes_block_size != 128 {
            return Err(CryptoError::InvalidArgument(format!(
                "aes_block_size must be 128 bits, got {}",
                self.aes_block_size
            )));
        }
        if self.salt_size < 64 || self.salt_size % 8 != 0 {
            return Err(CryptoError::InvalidArgument(format!(
                "salt_size must be a whole number of bytes and at least 64 bits, got {}",
                self.salt_size
            )));
        }
        if self.key_derivation_iterations == 0 {
            return Err(CryptoError::InvalidArgument(
                "key_derivation_iterations must be at least 1".to_string(),
            ));
        }
        if self.min_password_length == 0 {
            return Err(CryptoError::InvalidArgument(
                "min_password_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

static GLOBAL_SETTINGS: LazyLock<RwLock<EncryptionSettings>> =
    LazyLock::new(|| RwLock::new(EncryptionSettings::default()));

/// Returns a snapshot of the process-wide settings.
#[must_use]
pub fn settings() -> EncryptionSettings {
    GLOBAL_SETTINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide settings.
///
/// Operations already running keep the snapshot they started with.
///
/// # Errors
///
/// Returns an error if `new_settings` fails [`EncryptionSettings::validate`];
/// the current settings are left untouched in that case.
pub fn set_settings(new_settings: EncryptionSettings) -> CryptoResult<()> {
    new_settings.validate()?;
    *GLOBAL_SETTINGS
        .write()
        .unwrap_or_else(PoisonError::into_inner) = new_settings;
    tracing::debug!("process-wide encryption settings replaced");
    Ok(())
}

/// Restores the process-wide settings to their defaults.
pub fn reset_settings() {
    *GLOBAL_SETTINGS
        .write()
        .unwrap_or_else(PoisonError::into_inner) = EncryptionSettings::default();
}
