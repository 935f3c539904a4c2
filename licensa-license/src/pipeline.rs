//! Ordered license validation.

use crate::checks::{
    CheckContext, CheckOutcome, HardwareIdentityCheck, LicenseCheck, ProductKeyCheck,
    TimeLockCheck, UserIdentityCheck,
};
use crate::device::{HardwareFingerprintProvider, detect_platform};
use crate::error::{LicenseError, LicenseResult};
use crate::locale::{EnglishLocalizer, LanguageTag, Localizer};
use crate::model::{License, LicenseRequirements};
use crate::reader::LicenseReader;
use crate::source::LicenseSource;
use crate::user::{CurrentUser, UserEnvironment};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    /// True when no check failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.messages.is_empty()
    }

    /// Failure messages in check order, one per failing check.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// `Ok(())` on pass, otherwise the failure messages.
    ///
    /// # Errors
    ///
    /// Returns the messages when at least one check failed.
    pub fn into_result(self) -> Result<(), Vec<String>> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(self.messages)
        }
    }
}

/// Runs an ordered list of checks against a license.
///
/// Starts with the built-in checks in the order product key, hardware
/// identity, user identity, time lock. Further checks are appended with
/// [`Self::add_check`] and run after them. Every run collects its messages
/// into a fresh report, so one pipeline may serve concurrent callers.
pub struct ValidationPipeline {
    checks: Vec<Box<dyn LicenseCheck>>,
    localizer: Arc<dyn Localizer>,
    language: LanguageTag,
    reader: LicenseReader,
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationPipeline {
    /// Pipeline reading this machine's hardware and the current user.
    #[must_use]
    pub fn new() -> Self {
        Self::with_providers(detect_platform(), Arc::new(CurrentUser))
    }

    /// Pipeline using the given hardware and user providers.
    #[must_use]
    pub fn with_providers(
        hardware: Arc<dyn HardwareFingerprintProvider>,
        user: Arc<dyn UserEnvironment>,
    ) -> Self {
        Self {
            checks: vec![
                Box::new(ProductKeyCheck),
                Box::new(HardwareIdentityCheck::new(hardware)),
                Box::new(UserIdentityCheck::new(user)),
                Box::new(TimeLockCheck),
            ],
            localizer: Arc::new(EnglishLocalizer),
            language: LanguageTag::english(),
            reader: LicenseReader::new(),
        }
    }

    /// Uses `localizer` with `language` as the default for every run.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::UnsupportedLocale`] if `language` is malformed
    /// or the localizer has no table for it.
    pub fn with_localizer(
        mut self,
        localizer: Arc<dyn Localizer>,
        language: &str,
    ) -> LicenseResult<Self> {
        let language = LanguageTag::parse(language)?;
        if !localizer.supports(&language) {
            return Err(LicenseError::UnsupportedLocale(language.to_string()));
        }
        self.localizer = localizer;
        self.language = language;
        Ok(self)
    }

    /// Uses `reader` to unpack license text.
    #[must_use]
    pub fn with_reader(mut self, reader: LicenseReader) -> Self {
        self.reader = reader;
        self
    }

    /// Appends a check after the existing ones.
    pub fn add_check(&mut self, check: impl LicenseCheck + 'static) {
        self.checks.push(Box::new(check));
    }

    /// Names of the registered checks, in run order.
    #[must_use]
    pub fn checks(&self) -> Vec<&str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    /// Validates `license` in the default language.
    #[must_use]
    pub fn run(&self, license: &License, requirements: &LicenseRequirements) -> ValidationReport {
        self.evaluate(license, requirements, &self.language, Utc::now())
    }

    /// Validates `license` as if the current time were `now`.
    #[must_use]
    pub fn run_at(
        &self,
        license: &License,
        requirements: &LicenseRequirements,
        now: DateTime<Utc>,
    ) -> ValidationReport {
        self.evaluate(license, requirements, &self.language, now)
    }

    /// Validates `license` with messages in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::UnsupportedLocale`] if `language` is malformed
    /// or unsupported by the localizer.
    pub fn run_localized(
        &self,
        license: &License,
        requirements: &LicenseRequirements,
        language: &str,
    ) -> LicenseResult<ValidationReport> {
        let language = LanguageTag::parse(language)?;
        if !self.localizer.supports(&language) {
            return Err(LicenseError::UnsupportedLocale(language.to_string()));
        }
        Ok(self.evaluate(license, requirements, &language, Utc::now()))
    }

    /// Unpacks license text with the pipeline's reader, then validates it.
    ///
    /// `digest` is the published SHA-256 of `text`; it is only consulted,
    /// and then required, when `requirements.is_hashed` is set.
    ///
    /// # Errors
    ///
    /// Any error from [`LicenseReader::read`]. Failed checks are not errors.
    pub fn run_text(
        &self,
        text: &str,
        digest: Option<&str>,
        requirements: &LicenseRequirements,
    ) -> LicenseResult<ValidationReport> {
        let license = self.reader.read(text, digest, requirements)?;
        Ok(self.run(&license, requirements))
    }

    /// Reads a license from `source`, then validates it.
    ///
    /// # Errors
    ///
    /// Any error from the source or from [`LicenseReader::read_source`].
    pub fn check_source(
        &self,
        source: &dyn LicenseSource,
        requirements: &LicenseRequirements,
    ) -> LicenseResult<ValidationReport> {
        let license = self.reader.read_source(source, requirements)?;
        Ok(self.run(&license, requirements))
    }

    fn evaluate(
        &self,
        license: &License,
        requirements: &LicenseRequirements,
        language: &LanguageTag,
        now: DateTime<Utc>,
    ) -> ValidationReport {
        let context = CheckContext::new(requirements, self.localizer.as_ref(), language, now);
        let mut messages = Vec::new();

        debug!(checks = self.checks.len(), "validating license");
        for check in &self.checks {
            if !check.is_required(requirements) {
                continue;
            }
            if let CheckOutcome::Fail(message) = check.evaluate(license, &context) {
                warn!(check = check.name(), "license check failed");
                messages.push(message);
            }
        }

        info!(
            checks = self.checks.len(),
            failed = messages.len(),
            "license validation finished"
        );
        ValidationReport { messages }
    }
}
