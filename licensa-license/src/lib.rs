//! License documents and their validation.
//!
//! This crate handles:
//! - The license document model (product key, hardware identity, user
//!   identity and time lock claims) and the requirements it is checked against
//! - Unpacking stored licenses (digest verification, password decryption)
//! - An ordered, extensible pipeline of checks producing localized failure
//!   messages
//! - Hardware fingerprint and current-user providers
//!
//! # Example
//!
//! ```no_run
//! use licensa_license::{ClaimGroup, LicenseRequirements, TextSource, ValidationPipeline};
//!
//! let requirements = LicenseRequirements::for_types(ClaimGroup::TimeLock.into());
//! let source = TextSource::new(r#"{"Time Lock": {"License Expiry": "2099-01-01T00:00:00Z"}}"#);
//! let report = ValidationPipeline::new().check_source(&source, &requirements)?;
//! assert!(report.passed());
//! # Ok::<(), licensa_license::LicenseError>(())
//! ```

mod checks;
mod device;
mod error;
mod locale;
mod model;
mod pipeline;
mod reader;
mod source;
mod user;

pub use checks::{
    CheckContext, CheckOutcome, HardwareIdentityCheck, LicenseCheck, ProductKeyCheck,
    TimeLockCheck, UserIdentityCheck,
};
pub use device::{
    HardwareFingerprintProvider, StaticHardware, SysfsHardware, UnsupportedPlatform,
    detect_platform, looks_virtual, normalize_mac, parse_cpuinfo_serials,
};
pub use error::{LicenseError, LicenseResult};
pub use locale::{EnglishLocalizer, LanguageTag, Localizer, MessageKey, format_template};
pub use model::{
    ClaimGroup, HardwareChecks, HardwareIdentity, License, LicenseRequirements, LicenseTypes,
    ProductKey, ProductKeyFormat, TimeLock, UserIdentity,
};
pub use pipeline::{ValidationPipeline, ValidationReport};
pub use reader::{EncodedLicense, LicenseReader, license_digest};
pub use source::{FileSource, LicenseSource, TextSource};
pub use user::{CurrentUser, StaticUser, UserEnvironment};
