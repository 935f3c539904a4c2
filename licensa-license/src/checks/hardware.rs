use super::{CheckContext, CheckOutcome, LicenseCheck, present};
use crate::device::{HardwareFingerprintProvider, normalize_mac};
use crate::locale::MessageKey;
use crate::model::{ClaimGroup, License, LicenseRequirements};
use std::sync::Arc;

/// Compares the license's hardware claims with this machine.
///
/// Sub-checks run in a fixed order (CPU, drive, ethernet, wireless,
/// virtualization) and all of them run even after one fails. A value the
/// provider cannot read never matches.
pub struct HardwareIdentityCheck {
    provider: Arc<dyn HardwareFingerprintProvider>,
}

impl HardwareIdentityCheck {
    #[must_use]
    pub fn new(provider: Arc<dyn HardwareFingerprintProvider>) -> Self {
        Self { provider }
    }
}

impl LicenseCheck for HardwareIdentityCheck {
    fn name(&self) -> &str {
        ClaimGroup::HardwareIdentity.display_name()
    }

    fn is_required(&self, requirements: &LicenseRequirements) -> bool {
        requirements.license_type.requires(ClaimGroup::HardwareIdentity)
    }

    fn evaluate(&self, license: &License, context: &CheckContext<'_>) -> CheckOutcome {
        let claims = &license.hardware_identity;
        let toggles = context.requirements.hardware;
        let mut reasons = Vec::new();

        if toggles.cpu_serial
            && !serial_matches(claims.cpu_serial_number.as_ref(), &self.provider.cpu_serial(0))
        {
            reasons.push(MessageKey::HardwareCpuSerial);
        }
        if toggles.disk_serial
            && !serial_matches(
                claims.drive_serial_number.as_ref(),
                &self.provider.drive_serial(0),
            )
        {
            reasons.push(MessageKey::HardwareDriveSerial);
        }
        if toggles.ethernet_mac
            && !mac_matches(
                claims.ethernet_mac_address.as_ref(),
                &self.provider.primary_mac_address(),
            )
        {
            reasons.push(MessageKey::HardwareEthernetMac);
        }
        if toggles.wireless_mac
            && !mac_matches(
                claims.wireless_mac_address.as_ref(),
                &self.provider.wireless_mac_address(),
            )
        {
            reasons.push(MessageKey::HardwareWirelessMac);
        }
        if toggles.virtual_machine {
            match (claims.is_virtual_machine, self.provider.is_virtual_machine()) {
                (false, true) => reasons.push(MessageKey::HardwareVirtualBlocked),
                (true, false) => reasons.push(MessageKey::HardwareVirtualRequired),
                _ => {}
            }
        }

        context.fail_with(MessageKey::FailedHardwareIdentity, &reasons)
    }
}

fn serial_matches(claim: Option<&String>, actual: &str) -> bool {
    let actual = actual.trim();
    match present(claim) {
        Some(expected) => !actual.is_empty() && expected == actual,
        None => false,
    }
}

fn mac_matches(claim: Option<&String>, actual: &str) -> bool {
    let actual = normalize_mac(actual);
    match present(claim).map(normalize_mac) {
        Some(expected) => !actual.is_empty() && expected == actual,
        None => false,
    }
}
