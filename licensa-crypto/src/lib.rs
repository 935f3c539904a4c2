//! Authenticated symmetric encryption for license payloads.
//!
//! This crate provides:
//! - AES-CBC encryption authenticated with HMAC-SHA-256 (encrypt-then-MAC)
//! - Password mode, deriving independent cipher and authentication keys
//!   with PBKDF2 from two random salts carried in the message
//! - Secure random key and product-key generation
//! - Process-wide [`EncryptionSettings`] with per-call snapshots
//!
//! # Message format
//!
//! `[associated data][IV][ciphertext][HMAC tag]`, where password-mode
//! messages use `cipher_salt || auth_salt` as associated data. The format is
//! meant for short in-memory payloads, not streamed data.

mod cipher;
mod error;
mod key;
mod random;
mod settings;

pub use cipher::{
    AuthenticatedCipher, TAG_SIZE, constant_time_eq, decrypt_string, decrypt_symmetric,
    decrypt_symmetric_with_keys, encrypt_string, encrypt_symmetric, encrypt_symmetric_with_keys,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{KeyMaterial, Salt, SymmetricKey, derive_key};
pub use random::{CharacterSets, new_key, new_key_from_alphabet, new_key_with, new_string_key};
pub use settings::{EncryptionSettings, KdfHash, reset_settings, set_settings, settings};
