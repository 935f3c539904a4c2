use super::{CheckContext, CheckOutcome, LicenseCheck, present};
use crate::locale::MessageKey;
use crate::model::{ClaimGroup, License, LicenseRequirements};
use crate::user::UserEnvironment;
use std::sync::Arc;

/// Compares the license's user claims with the current user.
///
/// Only fields the license fills in are compared. Username, domain and
/// email address compare case-insensitively; the home folder compares
/// exactly.
pub struct UserIdentityCheck {
    user: Arc<dyn UserEnvironment>,
}

impl UserIdentityCheck {
    #[must_use]
    pub fn new(user: Arc<dyn UserEnvironment>) -> Self {
        Self { user }
    }
}

impl LicenseCheck for UserIdentityCheck {
    fn name(&self) -> &str {
        ClaimGroup::UserIdentity.display_name()
    }

    fn is_required(&self, requirements: &LicenseRequirements) -> bool {
        requirements.license_type.requires(ClaimGroup::UserIdentity)
    }

    fn evaluate(&self, license: &License, context: &CheckContext<'_>) -> CheckOutcome {
        let claims = &license.user_identity;
        let fields = [
            (
                present(claims.username.as_ref()),
                self.user.username(),
                MessageKey::UserUsername,
                false,
            ),
            (
                present(claims.domain.as_ref()),
                self.user.domain(),
                MessageKey::UserDomain,
                false,
            ),
            (
                present(claims.email_address.as_ref()),
                self.user.email_address(),
                MessageKey::UserEmailAddress,
                false,
            ),
            (
                present(claims.home_folder.as_ref()),
                self.user.home_folder(),
                MessageKey::UserHomeFolder,
                true,
            ),
        ];

        if fields.iter().all(|(claim, ..)| claim.is_none()) {
            return context.fail_with(MessageKey::FailedUserIdentity, &[MessageKey::UserNoClaims]);
        }

        let reasons: Vec<MessageKey> = fields
            .iter()
            .filter_map(|(claim, actual, key, exact)| {
                let expected = (*claim)?;
                let actual = actual.trim();
                let matches = if *exact {
                    expected == actual
                } else {
                    expected.eq_ignore_ascii_case(actual)
                };
                (!matches).then_some(*key)
            })
            .collect();

        context.fail_with(MessageKey::FailedUserIdentity, &reasons)
    }
}
