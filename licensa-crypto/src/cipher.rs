//! Payload encryption using AES-CBC with HMAC-SHA-256 (encrypt-then-MAC).
//!
//! Message layout, all fields concatenated without length prefixes:
//!
//! ```text
//! [ associated data ][ IV ][ ciphertext (PKCS#7 padded) ][ tag (32 bytes) ]
//! ```
//!
//! The tag covers every byte that precedes it. In password mode the
//! associated data is `cipher_salt || auth_salt`, so the salts travel with the
//! message and the decrypting side can re-derive both keys.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{KeyMaterial, Salt};
use crate::settings::{self, EncryptionSettings};
use aes::{Aes128, Aes192, Aes256};
use base64::{Engine, engine::general_purpose::STANDARD};
use cbc::cipher::{
    BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, block_padding::Pkcs7,
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tracing::debug;

/// Size of the authentication tag in bytes (HMAC-SHA-256 output).
pub const TAG_SIZE: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Authenticated symmetric cipher bound to one settings snapshot.
///
/// The snapshot is taken at construction, so concurrent changes to the
/// process-wide settings never affect an operation in progress.
#[derive(Debug, Clone)]
pub struct AuthenticatedCipher {
    settings: EncryptionSettings,
}

impl Default for AuthenticatedCipher {
    fn default() -> Self {
        Self {
            settings: settings::settings(),
        }
    }
}

impl AuthenticatedCipher {
    /// Creates a cipher that uses `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation.
    pub fn new(settings: EncryptionSettings) -> CryptoResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Returns the settings this cipher was built with.
    #[must_use]
    pub fn settings(&self) -> &EncryptionSettings {
        &self.settings
    }

    /// Length of the salt prefix written in password mode.
    #[must_use]
    pub fn password_prefix_len(&self) -> usize {
        self.settings.salt_byte_size() * 2
    }

    /// Encrypts `plaintext` with explicit keys.
    ///
    /// `associated_data` is written in the clear at the front of the message
    /// and covered by the tag.
    ///
    /// # Errors
    ///
    /// * [`CryptoError::InvalidKeySize`] if either key has the wrong length.
    /// * [`CryptoError::InvalidArgument`] if `plaintext` is empty.
    pub fn encrypt_with_keys(
        &self,
        plaintext: &[u8],
        cipher_key: &[u8],
        auth_key: &[u8],
        associated_data: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        self.check_key(cipher_key)?;
        self.check_key(auth_key)?;
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidArgument(
                "must provide data to encrypt".to_string(),
            ));
        }

        let mut iv = vec![0u8; self.settings.aes_block_byte_size()];
        rand::rngs::OsRng.fill_bytes(&mut iv);

        let ciphertext = match cipher_key.len() {
            16 => encrypt_blocks::<Aes128>(cipher_key, &iv, plaintext)?,
            24 => encrypt_blocks::<Aes192>(cipher_key, &iv, plaintext)?,
            _ => encrypt_blocks::<Aes256>(cipher_key, &iv, plaintext)?,
        };

        let mut message =
            Vec::with_capacity(associated_data.len() + iv.len() + ciphertext.len() + TAG_SIZE);
        message.extend_from_slice(associated_data);
        message.extend_from_slice(&iv);
        message.extend_from_slice(&ciphertext);

        let tag = compute_tag(auth_key, &message)?;
        message.extend_from_slice(&tag);

        debug!(
            plaintext_len = plaintext.len(),
            message_len = message.len(),
            "encrypted payload"
        );
        Ok(message)
    }

    /// Decrypts a message produced by [`Self::encrypt_with_keys`].
    ///
    /// `associated_data_len` is the number of clear bytes at the front of the
    /// message that precede the IV.
    ///
    /// # Errors
    ///
    /// * [`CryptoError::InvalidKeySize`] if either key has the wrong length.
    /// * [`CryptoError::InvalidArgument`] if the message is too short to hold
    ///   the associated data, an IV and a tag.
    /// * [`CryptoError::AuthenticationFailed`] on tag mismatch or bad padding.
    pub fn decrypt_with_keys(
        &self,
        message: &[u8],
        cipher_key: &[u8],
        auth_key: &[u8],
        associated_data_len: usize,
    ) -> CryptoResult<Vec<u8>> {
        self.check_key(cipher_key)?;
        self.check_key(auth_key)?;

        let iv_len = self.settings.aes_block_byte_size();
        let ciphertext_start = associated_data_len
            .checked_add(iv_len)
            .filter(|start| {
                start
                    .checked_add(TAG_SIZE)
                    .is_some_and(|min_len| message.len() >= min_len)
            })
            .ok_or_else(|| {
                CryptoError::InvalidArgument("message is too short to be valid".to_string())
            })?;

        let (authenticated, sent_tag) = message.split_at(message.len() - TAG_SIZE);
        let expected_tag = compute_tag(auth_key, authenticated)?;
        if !constant_time_eq(sent_tag, &expected_tag) {
            debug!(message_len = message.len(), "authentication tag mismatch");
            return Err(CryptoError::AuthenticationFailed);
        }

        let iv = &authenticated[associated_data_len..ciphertext_start];
        let ciphertext = &authenticated[ciphertext_start..];

        let plaintext = match cipher_key.len() {
            16 => decrypt_blocks::<Aes128>(cipher_key, iv, ciphertext)?,
            24 => decrypt_blocks::<Aes192>(cipher_key, iv, ciphertext)?,
            _ => decrypt_blocks::<Aes256>(cipher_key, iv, ciphertext)?,
        };

        debug!(
            message_len = message.len(),
            plaintext_len = plaintext.len(),
            "decrypted payload"
        );
        Ok(plaintext)
    }

    /// Encrypts `plaintext` with keys derived from `password`.
    ///
    /// Two fresh salts are generated per call and written in front of the IV.
    ///
    /// # Errors
    ///
    /// Fails with [`CryptoError::InvalidArgument`] if the password is too
    /// short or the plaintext is empty.
    pub fn encrypt_with_password(&self, plaintext: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidArgument(
                "must provide data to encrypt".to_string(),
            ));
        }

        let material = KeyMaterial::generate(password, &self.settings)?;
        self.encrypt_with_keys(
            plaintext,
            material.cipher_key.as_bytes(),
            material.auth_key.as_bytes(),
            &material.salt_prefix(),
        )
    }

    /// Decrypts a message produced by [`Self::encrypt_with_password`].
    ///
    /// # Errors
    ///
    /// * [`CryptoError::InvalidArgument`] if the password is too short or the
    ///   message cannot hold the salt prefix.
    /// * [`CryptoError::AuthenticationFailed`] if the password is wrong or the
    ///   message was modified.
    pub fn decrypt_with_password(&self, message: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
        let salt_len = self.settings.salt_byte_size();
        if message.len() < salt_len * 2 {
            return Err(CryptoError::InvalidArgument(
                "message is too short to be valid".to_string(),
            ));
        }

        let cipher_salt = Salt::from_slice(&message[..salt_len]);
        let auth_salt = Salt::from_slice(&message[salt_len..salt_len * 2]);
        let material = KeyMaterial::recover(password, cipher_salt, auth_salt, &self.settings)?;

        self.decrypt_with_keys(
            message,
            material.cipher_key.as_bytes(),
            material.auth_key.as_bytes(),
            salt_len * 2,
        )
    }

    /// Encrypts UTF-8 text with a password and returns standard base64.
    ///
    /// # Errors
    ///
    /// See [`Self::encrypt_with_password`]; blank text is rejected.
    pub fn encrypt_string_with_password(&self, text: &str, password: &str) -> CryptoResult<String> {
        require_text(text, "encrypt")?;
        let message = self.encrypt_with_password(text.as_bytes(), password)?;
        Ok(STANDARD.encode(message))
    }

    /// Decrypts base64 text produced by [`Self::encrypt_string_with_password`].
    ///
    /// # Errors
    ///
    /// See [`Self::decrypt_with_password`]; invalid base64 or non-UTF-8
    /// plaintext is reported as [`CryptoError::InvalidArgument`].
    pub fn decrypt_string_with_password(&self, encoded: &str, password: &str) -> CryptoResult<String> {
        require_text(encoded, "decrypt")?;
        let message = decode_base64(encoded)?;
        let plaintext = self.decrypt_with_password(&message, password)?;
        into_utf8(plaintext)
    }

    /// Encrypts UTF-8 text with explicit keys and returns standard base64.
    ///
    /// # Errors
    ///
    /// See [`Self::encrypt_with_keys`]; blank text is rejected.
    pub fn encrypt_string_with_keys(
        &self,
        text: &str,
        cipher_key: &[u8],
        auth_key: &[u8],
        associated_data: &[u8],
    ) -> CryptoResult<String> {
        require_text(text, "encrypt")?;
        let message = self.encrypt_with_keys(text.as_bytes(), cipher_key, auth_key, associated_data)?;
        Ok(STANDARD.encode(message))
    }

    /// Decrypts base64 text produced by [`Self::encrypt_string_with_keys`].
    ///
    /// # Errors
    ///
    /// See [`Self::decrypt_with_keys`].
    pub fn decrypt_string_with_keys(
        &self,
        encoded: &str,
        cipher_key: &[u8],
        auth_key: &[u8],
        associated_data_len: usize,
    ) -> CryptoResult<String> {
        require_text(encoded, "decrypt")?;
        let message = decode_base64(encoded)?;
        let plaintext = self.decrypt_with_keys(&message, cipher_key, auth_key, associated_data_len)?;
        into_utf8(plaintext)
    }

    fn check_key(&self, key: &[u8]) -> CryptoResult<()> {
        let expected = self.settings.aes_key_byte_size();
        if key.len() != expected {
            return Err(CryptoError::InvalidKeySize {
                expected,
                actual: key.len(),
            });
        }
        Ok(())
    }
}

/// Encrypts with keys derived from `password` using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::encrypt_with_password`].
pub fn encrypt_symmetric(plaintext: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
    AuthenticatedCipher::default().encrypt_with_password(plaintext, password)
}

/// Decrypts with keys derived from `password` using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::decrypt_with_password`].
pub fn decrypt_symmetric(message: &[u8], password: &str) -> CryptoResult<Vec<u8>> {
    AuthenticatedCipher::default().decrypt_with_password(message, password)
}

/// Encrypts with explicit keys using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::encrypt_with_keys`].
pub fn encrypt_symmetric_with_keys(
    plaintext: &[u8],
    cipher_key: &[u8],
    auth_key: &[u8],
    associated_data: &[u8],
) -> CryptoResult<Vec<u8>> {
    AuthenticatedCipher::default().encrypt_with_keys(plaintext, cipher_key, auth_key, associated_data)
}

/// Decrypts with explicit keys using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::decrypt_with_keys`].
pub fn decrypt_symmetric_with_keys(
    message: &[u8],
    cipher_key: &[u8],
    auth_key: &[u8],
    associated_data_len: usize,
) -> CryptoResult<Vec<u8>> {
    AuthenticatedCipher::default().decrypt_with_keys(message, cipher_key, auth_key, associated_data_len)
}

/// Encrypts text with a password and returns base64, using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::encrypt_string_with_password`].
pub fn encrypt_string(text: &str, password: &str) -> CryptoResult<String> {
    AuthenticatedCipher::default().encrypt_string_with_password(text, password)
}

/// Decrypts base64 text with a password, using the process-wide settings.
///
/// # Errors
///
/// See [`AuthenticatedCipher::decrypt_string_with_password`].
pub fn decrypt_string(encoded: &str, password: &str) -> CryptoResult<String> {
    AuthenticatedCipher::default().decrypt_string_with_password(encoded, password)
}

/// Compares two byte strings without exiting early on the first difference.
///
/// Every byte pair is XORed and the results ORed together, so the work done
/// depends only on the length. Slices of different length compare unequal.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}

fn compute_tag(auth_key: &[u8], data: &[u8]) -> CryptoResult<[u8; TAG_SIZE]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(auth_key)
        .map_err(|e| CryptoError::InvalidArgument(format!("unusable authentication key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

fn encrypt_blocks<C>(key: &[u8], iv: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let encryptor = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(|_| {
        CryptoError::InvalidArgument("key or IV length rejected by the block cipher".to_string())
    })?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn decrypt_blocks<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(|_| {
        CryptoError::InvalidArgument("key or IV length rejected by the block cipher".to_string())
    })?;
    // Padding errors are deliberately indistinguishable from tag mismatches.
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

fn require_text(text: &str, action: &str) -> CryptoResult<()> {
    if text.trim().is_empty() {
        return Err(CryptoError::InvalidArgument(format!(
            "must provide text to {action}"
        )));
    }
    Ok(())
}

fn decode_base64(encoded: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| CryptoError::InvalidArgument(format!("invalid base64: {e}")))
}

fn into_utf8(bytes: Vec<u8>) -> CryptoResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| CryptoError::InvalidArgument(format!("invalid UTF-8: {e}")))
}
