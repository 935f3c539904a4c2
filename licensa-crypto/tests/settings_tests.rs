//! Exercises the process-wide settings. Kept in its own test binary so that
//! no other test observes the temporary changes.

use licensa_crypto::{
    AuthenticatedCipher, CryptoError, EncryptionSettings, encrypt_symmetric, reset_settings,
    set_settings, settings,
};

#[test]
fn defaults() {
    let defaults = EncryptionSettings::default();
    assert_eq!(defaults.aes_key_size, 256);
    assert_eq!(defaults.aes_block_size, 128);
    assert_eq!(defaults.salt_size, 64);
    assert_eq!(defaults.key_derivation_iterations, 10_000);
    assert_eq!(defaults.min_password_length, 12);
    assert_eq!(defaults.aes_key_byte_size(), 32);
    assert_eq!(defaults.aes_block_byte_size(), 16);
    assert_eq!(defaults.salt_byte_size(), 8);
    assert!(defaults.validate().is_ok());
}

#[test]
fn validation_rejects_bad_values() {
    for bad in [
        EncryptionSettings {
            aes_block_size: 256,
            ..EncryptionSettings::default()
        },
        EncryptionSettings {
            salt_size: 60,
            ..EncryptionSettings::default()
        },
        EncryptionSettings {
            key_derivation_iterations: 0,
            ..EncryptionSettings::default()
        },
        EncryptionSettings {
            min_password_length: 0,
            ..EncryptionSettings::default()
        },
    ] {
        assert!(matches!(bad.validate(), Err(CryptoError::InvalidArgument(_))));
    }
}

#[test]
fn settings_deserialize_with_defaults() {
    let parsed: EncryptionSettings =
        serde_json::from_str(r#"{"min_password_length": 20, "kdf_hash": "sha1"}"#).unwrap();
    assert_eq!(parsed.min_password_length, 20);
    assert_eq!(parsed.aes_key_size, 256);
}

#[test]
fn global_settings_lifecycle() {
    assert_eq!(settings(), EncryptionSettings::default());

    // Invalid settings leave the current ones in place.
    let result = set_settings(EncryptionSettings {
        aes_key_size: 512,
        ..EncryptionSettings::default()
    });
    assert!(result.is_err());
    assert_eq!(settings(), EncryptionSettings::default());

    set_settings(EncryptionSettings {
        min_password_length: 40,
        key_derivation_iterations: 10,
        ..EncryptionSettings::default()
    })
    .unwrap();
    assert_eq!(settings().min_password_length, 40);

    // A cipher built earlier keeps its own snapshot.
    let snapshot = AuthenticatedCipher::new(EncryptionSettings::default()).unwrap();
    assert_eq!(snapshot.settings().min_password_length, 12);

    let result = encrypt_symmetric(b"payload", "twenty-nine characters long!!");
    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));

    reset_settings();
    assert_eq!(settings(), EncryptionSettings::default());
}
