use super::{CheckContext, CheckOutcome, LicenseCheck, present};
use crate::locale::MessageKey;
use crate::model::{ClaimGroup, License, LicenseRequirements};

/// Requires a non-blank product key, optionally of a given shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductKeyCheck;

impl LicenseCheck for ProductKeyCheck {
    fn name(&self) -> &str {
        ClaimGroup::ProductKey.display_name()
    }

    fn is_required(&self, requirements: &LicenseRequirements) -> bool {
        requirements.license_type.requires(ClaimGroup::ProductKey)
    }

    fn evaluate(&self, license: &License, context: &CheckContext<'_>) -> CheckOutcome {
        let Some(key) = present(license.product_key.key.as_ref()) else {
            return context.fail_with(MessageKey::FailedProductKey, &[MessageKey::ProductKeyMissing]);
        };

        let mut reasons = Vec::new();
        if let Some(format) = context.requirements.product_key_format {
            if key.chars().count() != format.length {
                reasons.push(MessageKey::ProductKeyLength);
            }
            if !format.character_sets.admits(key) {
                reasons.push(MessageKey::ProductKeyCharacters);
            }
        }
        context.fail_with(MessageKey::FailedProductKey, &reasons)
    }
}
