use super::{CheckContext, CheckOutcome, LicenseCheck};
use crate::locale::MessageKey;
use crate::model::{ClaimGroup, License, LicenseRequirements};
use chrono::SecondsFormat;

/// Passes while the license expiry lies strictly after the run's clock.
/// A time-locked license without an expiry fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeLockCheck;

impl LicenseCheck for TimeLockCheck {
    fn name(&self) -> &str {
        ClaimGroup::TimeLock.display_name()
    }

    fn is_required(&self, requirements: &LicenseRequirements) -> bool {
        requirements.license_type.requires(ClaimGroup::TimeLock)
    }

    fn evaluate(&self, license: &License, context: &CheckContext<'_>) -> CheckOutcome {
        match license.time_lock.license_expiry {
            Some(expiry) if expiry > context.now => CheckOutcome::Pass,
            Some(expiry) => {
                let formatted = expiry.to_rfc3339_opts(SecondsFormat::Secs, true);
                CheckOutcome::Fail(context.render(MessageKey::FailedTimeLockExpired, &[&formatted]))
            }
            None => CheckOutcome::Fail(context.render(MessageKey::FailedTimeLockMissing, &[])),
        }
    }
}
