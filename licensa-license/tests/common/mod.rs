//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use licensa_crypto::{AuthenticatedCipher, EncryptionSettings};
use licensa_license::{
    HardwareIdentity, License, ProductKey, StaticHardware, StaticUser, TimeLock, UserIdentity,
    ValidationPipeline,
};
use std::sync::{Arc, Once};

pub const PASSWORD: &str = "correct horse battery staple!";

/// Routes `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Fixed evaluation time: 2025-06-01T12:00:00Z.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Low iteration count keeps password tests fast.
pub fn fast_cipher() -> AuthenticatedCipher {
    AuthenticatedCipher::new(EncryptionSettings {
        key_derivation_iterations: 10,
        ..EncryptionSettings::default()
    })
    .unwrap()
}

pub fn machine() -> StaticHardware {
    StaticHardware {
        cpu_serials: vec!["BFEBFBFF000906EA".to_string()],
        drive_serials: vec!["S4EVNX0N123456".to_string()],
        ethernet_mac: "00:1a:2b:3c:4d:5e".to_string(),
        wireless_mac: "a4:5e:60:e1:22:33".to_string(),
        virtual_machine: false,
    }
}

pub fn user() -> StaticUser {
    StaticUser {
        username: "jdoe".to_string(),
        domain: "ACME".to_string(),
        email_address: "jdoe@acme.example".to_string(),
        home_folder: "/home/jdoe".to_string(),
    }
}

pub fn pipeline() -> ValidationPipeline {
    init_tracing();
    ValidationPipeline::with_providers(Arc::new(machine()), Arc::new(user()))
}

/// A license matching [`machine`] and [`user`], expiring after [`now`].
pub fn matching_license() -> License {
    License {
        product_key: ProductKey {
            key: Some("7Q2K9M4X8R1T5W3Z".to_string()),
        },
        hardware_identity: HardwareIdentity {
            cpu_serial_number: Some("BFEBFBFF000906EA".to_string()),
            drive_serial_number: Some("S4EVNX0N123456".to_string()),
            ethernet_mac_address: Some("00-1A-2B-3C-4D-5E".to_string()),
            wireless_mac_address: Some("A4:5E:60:E1:22:33".to_string()),
            is_virtual_machine: false,
        },
        user_identity: UserIdentity {
            username: Some("JDoe".to_string()),
            domain: Some("acme".to_string()),
            email_address: Some("JDOE@acme.example".to_string()),
            home_folder: Some("/home/jdoe".to_string()),
        },
        time_lock: TimeLock {
            license_expiry: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        },
    }
}
