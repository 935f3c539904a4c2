//! License checks.
//!
//! Each check covers one claim group. The pipeline asks a check whether its
//! group is required before evaluating it, so a check whose group is not
//! required always passes without looking at the license.

mod hardware;
mod product_key;
mod time_lock;
mod user;

pub use hardware::HardwareIdentityCheck;
pub use product_key::ProductKeyCheck;
pub use time_lock::TimeLockCheck;
pub use user::UserIdentityCheck;

use crate::locale::{LanguageTag, Localizer, MessageKey};
use crate::model::{License, LicenseRequirements};
use chrono::{DateTime, Utc};

/// Result of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    /// Failed, with one rendered message.
    Fail(String),
}

impl CheckOutcome {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Everything a check may consult besides the license itself.
///
/// Built once per validation run; `now` is fixed for the whole run.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub requirements: &'a LicenseRequirements,
    pub localizer: &'a dyn Localizer,
    pub language: &'a LanguageTag,
    pub now: DateTime<Utc>,
}

impl<'a> CheckContext<'a> {
    #[must_use]
    pub fn new(
        requirements: &'a LicenseRequirements,
        localizer: &'a dyn Localizer,
        language: &'a LanguageTag,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            requirements,
            localizer,
            language,
            now,
        }
    }

    /// Renders a message in the run's language.
    #[must_use]
    pub fn render(&self, key: MessageKey, args: &[&str]) -> String {
        self.localizer.render(key, self.language, args)
    }

    /// Fails with `key` wrapping the comma-joined `reasons`, or passes if
    /// there are none.
    #[must_use]
    pub fn fail_with(&self, key: MessageKey, reasons: &[MessageKey]) -> CheckOutcome {
        if reasons.is_empty() {
            return CheckOutcome::Pass;
        }
        let joined = reasons
            .iter()
            .map(|reason| self.render(*reason, &[]))
            .collect::<Vec<_>>()
            .join(", ");
        CheckOutcome::Fail(self.render(key, &[&joined]))
    }
}

/// One validation step over a license.
pub trait LicenseCheck: Send + Sync {
    /// Short name used in logs and [`crate::ValidationPipeline::checks`].
    fn name(&self) -> &str;

    /// Whether the requirements ask for this check at all.
    fn is_required(&self, requirements: &LicenseRequirements) -> bool;

    /// Evaluates the license. Only called when [`Self::is_required`] is true.
    fn evaluate(&self, license: &License, context: &CheckContext<'_>) -> CheckOutcome;
}

/// Treats blank strings as absent.
pub(crate) fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}
