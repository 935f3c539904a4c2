//! Key derivation and management.
//!
//! Uses PBKDF2 to turn a password into two independent keys: one for the
//! block cipher and one for message authentication. Each key is derived from
//! its own randomly generated salt.

use crate::error::{CryptoError, CryptoResult};
use crate::settings::{EncryptionSettings, KdfHash};
use rand::RngCore;
use sha1::Sha1;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key bytes with automatic zeroization on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Wraps raw key bytes. Length is checked when the key is used.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copies key bytes out of a slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the key holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Salt for key derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: Vec<u8>,
}

impl Salt {
    /// Generates a random salt of `len` bytes from the OS source.
    pub fn random(len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a salt from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copies salt bytes out of a slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Returns the salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A cipher key and an authentication key derived from one password, along
/// with the salts that produced them.
#[derive(Debug)]
pub struct KeyMaterial {
    pub cipher_key: SymmetricKey,
    pub auth_key: SymmetricKey,
    pub cipher_salt: Salt,
    pub auth_salt: Salt,
}

impl KeyMaterial {
    /// Derives fresh key material from `password` using two newly generated salts.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::InvalidArgument`] if the password is shorter
    /// than `settings.min_password_length`.
    pub fn generate(password: &str, settings: &EncryptionSettings) -> CryptoResult<Self> {
        validate_password(password, settings)?;

        let salt_len = settings.salt_byte_size();
        let cipher_salt = Salt::random(salt_len);
        let mut auth_salt = Salt::random(salt_len);
        while auth_salt == cipher_salt {
            auth_salt = Salt::random(salt_len);
        }

        Self::with_salts(password, cipher_salt, auth_salt, settings)
    }

    /// Re-derives key material from `password` and previously used salts.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::InvalidArgument`] if the password is too short
    /// or both salts are identical.
    pub fn with_salts(
        password: &str,
        cipher_salt: Salt,
        auth_salt: Salt,
        settings: &EncryptionSettings,
    ) -> CryptoResult<Self> {
        if cipher_salt == auth_salt {
            return Err(CryptoError::InvalidArgument(
                "cipher and authentication salts must differ".to_string(),
            ));
        }
        Self::recover(password, cipher_salt, auth_salt, settings)
    }

    /// Re-derives key material for decrypting a received message.
    ///
    /// Unlike [`Self::with_salts`] this accepts identical salts: the salts
    /// come from the message itself, and a message whose salts were altered
    /// fails the tag check instead.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::InvalidArgument`] if the password is too short.
    pub fn recover(
        password: &str,
        cipher_salt: Salt,
        auth_salt: Salt,
        settings: &EncryptionSettings,
    ) -> CryptoResult<Self> {
        let cipher_key = derive_key(password, &cipher_salt, settings)?;
        let auth_key = derive_key(password, &auth_salt, settings)?;

        Ok(Self {
            cipher_key,
            auth_key,
            cipher_salt,
            auth_salt,
        })
    }

    /// Returns `cipher_salt || auth_salt`, the associated data prefix of a
    /// password-mode message.
    pub fn salt_prefix(&self) -> Vec<u8> {
        let mut prefix =
            Vec::with_capacity(self.cipher_salt.as_bytes().len() + self.auth_salt.as_bytes().len());
        prefix.extend_from_slice(self.cipher_salt.as_bytes());
        prefix.extend_from_slice(self.auth_salt.as_bytes());
        prefix
    }
}

/// Derives a single key of `settings.aes_key_byte_size()` bytes with PBKDF2.
///
/// # Errors
///
/// Fails with [`CryptoError::InvalidArgument`] if the password is blank or
/// shorter than `settings.min_password_length` characters.
pub fn derive_key(
    password: &str,
    salt: &Salt,
    settings: &EncryptionSettings,
) -> CryptoResult<SymmetricKey> {
    validate_password(password, settings)?;

    let mut key_bytes = vec![0u8; settings.aes_key_byte_size()];
    let iterations = settings.key_derivation_iterations;
    match settings.kdf_hash {
        KdfHash::Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(
            password.as_bytes(),
            salt.as_bytes(),
            iterations,
            &mut key_bytes,
        ),
        KdfHash::Sha1 => pbkdf2::pbkdf2_hmac::<Sha1>(
            password.as_bytes(),
            salt.as_bytes(),
            iterations,
            &mut key_bytes,
        ),
    }

    Ok(SymmetricKey::from_bytes(key_bytes))
}

/// Rejects blank passwords and passwords shorter than the configured
/// minimum. Length is counted in Unicode scalar values, so a character
/// outside the Basic Multilingual Plane counts once rather than as two
/// UTF-16 code units.
fn validate_password(password: &str, settings: &EncryptionSettings) -> CryptoResult<()> {
    if password.trim().is_empty() || password.chars().count() < settings.min_password_length {
        return Err(CryptoError::InvalidArgument(format!(
            "password must be at least {} characters long",
            settings.min_password_length
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> EncryptionSettings {
        EncryptionSettings {
            key_derivation_iterations: 2,
            ..EncryptionSettings::default()
        }
    }

    #[test]
    fn generated_salts_are_distinct() {
        let material = KeyMaterial::generate("a sufficiently long pw", &fast()).unwrap();
        assert_ne!(material.cipher_salt, material.auth_salt);
        assert_ne!(material.cipher_key, material.auth_key);
    }

    #[test]
    fn salt_prefix_is_cipher_then_auth() {
        let material = KeyMaterial::generate("a sufficiently long pw", &fast()).unwrap();
        let prefix = material.salt_prefix();
        assert_eq!(&prefix[..8], material.cipher_salt.as_bytes());
        assert_eq!(&prefix[8..], material.auth_salt.as_bytes());
    }

    #[test]
    fn password_length_counts_characters() {
        // Twelve characters, more than twelve bytes.
        let password = "ééééééééééé!";
        assert_eq!(password.chars().count(), 12);
        assert!(validate_password(password, &fast()).is_ok());
    }
}
