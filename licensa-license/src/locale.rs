//! Failure message localization.
//!
//! Checks never build user-facing text directly. They pick a [`MessageKey`]
//! and arguments, and a [`Localizer`] supplies the template for the active
//! [`LanguageTag`]. Templates use positional `{0}`, `{1}`, ... placeholders.

use crate::error::{LicenseError, LicenseResult};
use std::fmt;

/// A validated language tag of the form `xx` or `xx-YY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parses a language tag.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::UnsupportedLocale`] for anything other than a
    /// two-letter language optionally followed by `-` and a two-letter region.
    pub fn parse(tag: &str) -> LicenseResult<Self> {
        let bytes = tag.as_bytes();
        let valid = match bytes.len() {
            2 => bytes.iter().all(u8::is_ascii_alphabetic),
            5 => {
                bytes[2] == b'-'
                    && bytes[..2].iter().all(u8::is_ascii_alphabetic)
                    && bytes[3..].iter().all(u8::is_ascii_alphabetic)
            }
            _ => false,
        };
        if !valid {
            return Err(LicenseError::UnsupportedLocale(tag.to_string()));
        }
        Ok(Self(tag.to_string()))
    }

    /// English, the built-in default.
    #[must_use]
    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// The two-letter language part, lowercased.
    #[must_use]
    pub fn language(&self) -> String {
        self.0[..2].to_ascii_lowercase()
    }

    /// The tag as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a failure message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// `{0}`: the reason.
    FailedProductKey,
    ProductKeyMissing,
    ProductKeyLength,
    ProductKeyCharacters,
    /// `{0}`: comma-separated list of mismatches.
    FailedHardwareIdentity,
    HardwareCpuSerial,
    HardwareDriveSerial,
    HardwareEthernetMac,
    HardwareWirelessMac,
    HardwareVirtualBlocked,
    HardwareVirtualRequired,
    /// `{0}`: comma-separated list of mismatches.
    FailedUserIdentity,
    UserUsername,
    UserDomain,
    UserEmailAddress,
    UserHomeFolder,
    UserNoClaims,
    /// `{0}`: the expiry timestamp.
    FailedTimeLockExpired,
    FailedTimeLockMissing,
}

/// Maps message keys to templates for supported languages.
pub trait Localizer: Send + Sync {
    /// Returns true if templates exist for `language`.
    fn supports(&self, language: &LanguageTag) -> bool;

    /// Returns the template for `key` in `language`.
    fn template(&self, key: MessageKey, language: &LanguageTag) -> String;

    /// Renders `key` with positional arguments.
    fn render(&self, key: MessageKey, language: &LanguageTag, args: &[&str]) -> String {
        format_template(&self.template(key, language), args)
    }
}

/// Built-in English message table.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn supports(&self, language: &LanguageTag) -> bool {
        language.language() == "en"
    }

    fn template(&self, key: MessageKey, _language: &LanguageTag) -> String {
        english(key).to_string()
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::FailedProductKey => "The product key is not valid ({0}).",
        MessageKey::ProductKeyMissing => "no product key",
        MessageKey::ProductKeyLength => "wrong length",
        MessageKey::ProductKeyCharacters => "unexpected characters",
        MessageKey::FailedHardwareIdentity => {
            "The license is not valid for this hardware ({0})."
        }
        MessageKey::HardwareCpuSerial => "CPU serial number",
        MessageKey::HardwareDriveSerial => "drive serial number",
        MessageKey::HardwareEthernetMac => "ethernet MAC address",
        MessageKey::HardwareWirelessMac => "wireless MAC address",
        MessageKey::HardwareVirtualBlocked => "virtual machines are not permitted",
        MessageKey::HardwareVirtualRequired => "a virtual machine is required",
        MessageKey::FailedUserIdentity => "The license is not valid for this user ({0}).",
        MessageKey::UserUsername => "username",
        MessageKey::UserDomain => "domain",
        MessageKey::UserEmailAddress => "email address",
        MessageKey::UserHomeFolder => "home folder",
        MessageKey::UserNoClaims => "no user details in license",
        MessageKey::FailedTimeLockExpired => "The license expired on {0}.",
        MessageKey::FailedTimeLockMissing => "The license is time locked but has no expiry date.",
    }
}

/// Substitutes `{0}`, `{1}`, ... in `template` with `args`. Placeholders
/// without a matching argument are left as they are.
#[must_use]
pub fn format_template(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, arg)| {
            text.replace(&format!("{{{i}}}"), arg)
        })
}
