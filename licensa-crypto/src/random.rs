//! Cryptographically secure key and product-key generation.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use crate::settings::{self, EncryptionSettings};
use bitflags::bitflags;
use rand::RngCore;
use serde::{Deserialize, Serialize};

const NUMERIC: &str = "0123456789";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PUNCTUATION: &str = "`~!@#$%^&*()_-=+[]{}|;:,.<>?";

bitflags! {
    /// Character ranges that string keys may draw from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CharacterSets: u8 {
        /// `0-9`
        const NUMERIC = 0b0000_0001;
        /// `a-z`
        const LOWERCASE = 0b0000_0010;
        /// `A-Z`
        const UPPERCASE = 0b0000_0100;
        /// ``"`~!@#$%^&*()_-=+[]{}|;:,.<>?"``
        const PUNCTUATION = 0b0000_1000;
    }
}

impl CharacterSets {
    /// Returns the union of the selected ranges, in flag order.
    #[must_use]
    pub fn alphabet(self) -> Vec<char> {
        let mut alphabet = Vec::new();
        for (flag, chars) in [
            (Self::NUMERIC, NUMERIC),
            (Self::LOWERCASE, LOWERCASE),
            (Self::UPPERCASE, UPPERCASE),
            (Self::PUNCTUATION, PUNCTUATION),
        ] {
            if self.contains(flag) {
                alphabet.extend(chars.chars());
            }
        }
        alphabet
    }

    /// Returns true if every character of `text` belongs to the selected ranges.
    #[must_use]
    pub fn admits(self, text: &str) -> bool {
        let alphabet = self.alphabet();
        text.chars().all(|c| alphabet.contains(&c))
    }
}

/// Generates a random key sized for the process-wide settings.
#[must_use]
pub fn new_key() -> SymmetricKey {
    new_key_with(&settings::settings())
}

/// Generates a random key of `settings.aes_key_byte_size()` bytes.
#[must_use]
pub fn new_key_with(settings: &EncryptionSettings) -> SymmetricKey {
    let mut bytes = vec![0u8; settings.aes_key_byte_size()];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    SymmetricKey::from_bytes(bytes)
}

/// Generates a random string of `length` characters drawn from `character_sets`.
///
/// # Errors
///
/// Fails with [`CryptoError::InvalidArgument`] if no character set is selected.
pub fn new_string_key(length: usize, character_sets: CharacterSets) -> CryptoResult<String> {
    new_key_from_alphabet(length, &character_sets.alphabet())
}

/// Generates a random string of `length` characters drawn from `alphabet`.
///
/// Each position takes a fresh 32-bit value from the OS source reduced modulo
/// the alphabet size. For alphabets of a few dozen characters the resulting
/// bias is below one part in 10^7 per draw and is accepted.
///
/// # Errors
///
/// Fails with [`CryptoError::InvalidArgument`] if `alphabet` is empty.
pub fn new_key_from_alphabet(length: usize, alphabet: &[char]) -> CryptoResult<String> {
    if alphabet.is_empty() {
        return Err(CryptoError::InvalidArgument(
            "at least one character must be available for key generation".to_string(),
        ));
    }

    let mut rng = rand::rngs::OsRng;
    let size = alphabet.len() as u64;
    let key = (0..length)
        .map(|_| {
            let index = u64::from(rng.next_u32()) % size;
            alphabet[index as usize]
        })
        .collect();

    Ok(key)
}
