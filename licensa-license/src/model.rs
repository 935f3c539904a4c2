//! License document and requirement models.
//!
//! Field names in the JSON encoding are part of the compatibility surface
//! and must never change between versions.

use chrono::{DateTime, Utc};
use licensa_crypto::CharacterSets;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One named section of a license document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimGroup {
    ProductKey,
    HardwareIdentity,
    UserIdentity,
    TimeLock,
}

impl ClaimGroup {
    /// All claim groups, in built-in check order.
    pub const ALL: [ClaimGroup; 4] = [
        ClaimGroup::ProductKey,
        ClaimGroup::HardwareIdentity,
        ClaimGroup::UserIdentity,
        ClaimGroup::TimeLock,
    ];

    /// Bit used for this group in the serialized license type.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::ProductKey => 0b0001,
            Self::HardwareIdentity => 0b0010,
            Self::UserIdentity => 0b0100,
            Self::TimeLock => 0b1000,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ProductKey => "Product Key",
            Self::HardwareIdentity => "Hardware Identity",
            Self::UserIdentity => "User Identity",
            Self::TimeLock => "Time Lock",
        }
    }
}

/// Which claim groups a license must carry and pass.
///
/// Serialized as a bit mask (product key = 1, hardware identity = 2,
/// user identity = 4, time locked = 8) so existing requirement files keep
/// loading; unknown bits are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LicenseTypes {
    /// The license must contain a valid product key.
    pub product_key: bool,
    /// The license must match this machine's hardware.
    pub hardware_identity: bool,
    /// The license must match the current user.
    pub user_identity: bool,
    /// The license must carry an expiry that has not passed.
    pub time_locked: bool,
}

impl LicenseTypes {
    /// No claim group required.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            product_key: false,
            hardware_identity: false,
            user_identity: false,
            time_locked: false,
        }
    }

    /// Every claim group required.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            product_key: true,
            hardware_identity: true,
            user_identity: true,
            time_locked: true,
        }
    }

    /// Returns a copy that also requires `group`.
    #[must_use]
    pub const fn with(mut self, group: ClaimGroup) -> Self {
        match group {
            ClaimGroup::ProductKey => self.product_key = true,
            ClaimGroup::HardwareIdentity => self.hardware_identity = true,
            ClaimGroup::UserIdentity => self.user_identity = true,
            ClaimGroup::TimeLock => self.time_locked = true,
        }
        self
    }

    /// Returns true if `group` is required.
    #[must_use]
    pub const fn requires(self, group: ClaimGroup) -> bool {
        match group {
            ClaimGroup::ProductKey => self.product_key,
            ClaimGroup::HardwareIdentity => self.hardware_identity,
            ClaimGroup::UserIdentity => self.user_identity,
            ClaimGroup::TimeLock => self.time_locked,
        }
    }

    /// Bit mask form.
    #[must_use]
    pub fn bits(self) -> u8 {
        ClaimGroup::ALL
            .iter()
            .filter(|g| self.requires(**g))
            .fold(0, |acc, g| acc | g.bit())
    }

    /// Builds from a bit mask, ignoring unknown bits.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        ClaimGroup::ALL
            .iter()
            .filter(|g| bits & g.bit() != 0)
            .fold(Self::none(), |acc, g| acc.with(*g))
    }
}

impl From<ClaimGroup> for LicenseTypes {
    fn from(group: ClaimGroup) -> Self {
        Self::none().with(group)
    }
}

impl Serialize for LicenseTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for LicenseTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(Self::from_bits)
    }
}

/// Hardware comparisons performed by the hardware identity check.
///
/// Each toggle only takes effect when [`LicenseTypes::hardware_identity`]
/// is also set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareChecks {
    /// Compare the first CPU's serial number.
    #[serde(rename = "Check CPU Serial")]
    pub cpu_serial: bool,
    /// Compare the primary disk's serial number.
    #[serde(rename = "Check Disk Serial")]
    pub disk_serial: bool,
    /// Compare the primary wired interface's MAC address.
    #[serde(rename = "Check Ethernet MAC")]
    pub ethernet_mac: bool,
    /// Compare the primary wireless interface's MAC address.
    #[serde(rename = "Check Wireless MAC")]
    pub wireless_mac: bool,
    /// Compare virtualization status.
    #[serde(rename = "Check Virtual Machine")]
    pub virtual_machine: bool,
}

/// Shape a product key must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductKeyFormat {
    /// Exact key length in characters.
    #[serde(rename = "Length")]
    pub length: usize,
    /// Character ranges the key may use.
    #[serde(rename = "Character Sets")]
    pub character_sets: CharacterSets,
}

/// How licenses are checked. Supplied by the host application and treated
/// as read-only for the duration of a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseRequirements {
    /// Claim groups that must be present and pass.
    #[serde(rename = "License Type")]
    pub license_type: LicenseTypes,
    /// Licenses come with a SHA-256 digest that must match the license text.
    #[serde(rename = "Is Hashed")]
    pub is_hashed: bool,
    /// Licenses are password-encrypted and must be decrypted before checking.
    #[serde(rename = "Is Encrypted")]
    pub is_encrypted: bool,
    /// Hardware sub-check toggles.
    #[serde(flatten)]
    pub hardware: HardwareChecks,
    /// Optional product key shape.
    #[serde(rename = "Product Key Format", skip_serializing_if = "Option::is_none")]
    pub product_key_format: Option<ProductKeyFormat>,
}

impl Default for LicenseRequirements {
    fn default() -> Self {
        Self {
            license_type: ClaimGroup::ProductKey.into(),
            is_hashed: false,
            is_encrypted: false,
            hardware: HardwareChecks::default(),
            product_key_format: None,
        }
    }
}

impl LicenseRequirements {
    /// Requirements demanding exactly `license_type`, with all else default.
    #[must_use]
    pub fn for_types(license_type: LicenseTypes) -> Self {
        Self {
            license_type,
            ..Self::default()
        }
    }

    /// Parses requirements from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the JSON is malformed.
    pub fn from_json(json: &str) -> crate::LicenseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Product key claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductKey {
    #[serde(rename = "Key")]
    pub key: Option<String>,
}

/// Hardware identity claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareIdentity {
    #[serde(rename = "CPU Serial Number")]
    pub cpu_serial_number: Option<String>,
    /// Operating system drive.
    #[serde(rename = "Drive Serial Number")]
    pub drive_serial_number: Option<String>,
    /// First wired interface.
    #[serde(rename = "Ethernet MAC Address")]
    pub ethernet_mac_address: Option<String>,
    /// First wireless interface.
    #[serde(rename = "Wireless MAC Address")]
    pub wireless_mac_address: Option<String>,
    /// Whether the license is meant to run inside a virtual machine.
    #[serde(rename = "Is Virtual Machine")]
    pub is_virtual_machine: bool,
}

/// User identity claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserIdentity {
    #[serde(rename = "Username")]
    pub username: Option<String>,
    #[serde(rename = "Domain")]
    pub domain: Option<String>,
    #[serde(rename = "Email Address")]
    pub email_address: Option<String>,
    #[serde(rename = "Home Folder")]
    pub home_folder: Option<String>,
}

/// Time lock claim. A missing expiry means "never expires" unless the
/// requirements demand a time lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeLock {
    #[serde(rename = "License Expiry", with = "expiry_format")]
    pub license_expiry: Option<DateTime<Utc>>,
}

/// A license document: four claim groups, each optional in the encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    #[serde(rename = "Product Key")]
    pub product_key: ProductKey,
    #[serde(rename = "Hardware Identity")]
    pub hardware_identity: HardwareIdentity,
    #[serde(rename = "User Identity")]
    pub user_identity: UserIdentity,
    #[serde(rename = "Time Lock")]
    pub time_lock: TimeLock,
}

impl License {
    /// Parses a license from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LicenseError::InvalidArgument`] for blank text and a
    /// serialization error for malformed JSON.
    pub fn from_json(text: &str) -> crate::LicenseResult<Self> {
        if text.trim().is_empty() {
            return Err(crate::LicenseError::InvalidArgument(
                "must provide license to check".to_string(),
            ));
        }
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the license to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_json(&self) -> crate::LicenseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Expiry timestamps are written as RFC 3339. Timestamps without an offset
/// are read as UTC.
mod expiry_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(|e| D::Error::custom(format!("invalid license expiry {raw:?}: {e}")))
    }
}
