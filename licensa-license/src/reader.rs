//! Packaging of license documents.
//!
//! A stored license is JSON, optionally password-encrypted into base64 text,
//! and optionally published with a SHA-256 digest of the stored text. The
//! requirements' `is_encrypted` and `is_hashed` flags say which layers to
//! expect.

use crate::error::{LicenseError, LicenseResult};
use crate::model::{License, LicenseRequirements};
use crate::source::LicenseSource;
use licensa_crypto::{AuthenticatedCipher, constant_time_eq};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

/// A license ready to be stored: the text and, for hashed licenses, its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLicense {
    pub text: String,
    pub digest: Option<String>,
}

/// Reads and writes packaged licenses.
#[derive(Clone, Default)]
pub struct LicenseReader {
    cipher: AuthenticatedCipher,
    password: Option<String>,
}

impl fmt::Debug for LicenseReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseReader")
            .field("cipher", &self.cipher)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LicenseReader {
    /// Reader using the process-wide encryption settings and no password.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `cipher` for encrypted licenses.
    #[must_use]
    pub fn with_cipher(mut self, cipher: AuthenticatedCipher) -> Self {
        self.cipher = cipher;
        self
    }

    /// Sets the password for encrypted licenses.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Unpacks license text into a [`License`].
    ///
    /// # Errors
    ///
    /// * [`LicenseError::InvalidArgument`] for blank text, or when a required
    ///   digest or password is missing.
    /// * [`LicenseError::IntegrityMismatch`] if the digest does not match.
    /// * [`LicenseError::Crypto`] if decryption fails.
    /// * [`LicenseError::Serialization`] for malformed JSON.
    pub fn read(
        &self,
        text: &str,
        digest: Option<&str>,
        requirements: &LicenseRequirements,
    ) -> LicenseResult<License> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LicenseError::InvalidArgument(
                "must provide license to check".to_string(),
            ));
        }

        if requirements.is_hashed {
            let expected = digest.map(str::trim).filter(|d| !d.is_empty()).ok_or_else(|| {
                LicenseError::InvalidArgument("hashed license requires a digest".to_string())
            })?;
            let actual = license_digest(text);
            if !constant_time_eq(actual.as_bytes(), expected.to_ascii_lowercase().as_bytes()) {
                return Err(LicenseError::IntegrityMismatch);
            }
        }

        if requirements.is_encrypted {
            let json = self
                .cipher
                .decrypt_string_with_password(text, self.password()?)?;
            debug!(bytes = json.len(), "decrypted license");
            return License::from_json(&json);
        }

        License::from_json(text)
    }

    /// Reads the license and its digest from `source`, then unpacks it.
    ///
    /// # Errors
    ///
    /// Any error from the source or from [`Self::read`].
    pub fn read_source(
        &self,
        source: &dyn LicenseSource,
        requirements: &LicenseRequirements,
    ) -> LicenseResult<License> {
        let text = source.read_license()?;
        let digest = if requirements.is_hashed {
            source.read_digest()?
        } else {
            None
        };
        self.read(&text, digest.as_deref(), requirements)
    }

    /// Packages `license` for storage, the inverse of [`Self::read`].
    ///
    /// # Errors
    ///
    /// * [`LicenseError::InvalidArgument`] if encryption is required and no
    ///   password is set.
    /// * [`LicenseError::Crypto`] if encryption fails.
    pub fn write(
        &self,
        license: &License,
        requirements: &LicenseRequirements,
    ) -> LicenseResult<EncodedLicense> {
        let json = license.to_json()?;
        let text = if requirements.is_encrypted {
            self.cipher
                .encrypt_string_with_password(&json, self.password()?)?
        } else {
            json
        };
        let digest = requirements.is_hashed.then(|| license_digest(&text));
        Ok(EncodedLicense { text, digest })
    }

    fn password(&self) -> LicenseResult<&str> {
        self.password.as_deref().ok_or_else(|| {
            LicenseError::InvalidArgument("encrypted license requires a password".to_string())
        })
    }
}

/// Lowercase hex SHA-256 of the stored license text, ignoring surrounding
/// whitespace.
#[must_use]
pub fn license_digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.trim().as_bytes()))
}
