use licensa_license::{
    EnglishLocalizer, LanguageTag, LicenseError, Localizer, MessageKey, format_template,
};

#[test]
fn language_tags_accept_language_and_region() {
    assert_eq!(LanguageTag::parse("en").unwrap().as_str(), "en");
    let tag = LanguageTag::parse("en-GB").unwrap();
    assert_eq!(tag.language(), "en");
    assert_eq!(tag.to_string(), "en-GB");
}

#[test]
fn malformed_language_tags_are_rejected() {
    for bad in ["", "e", "eng", "en_GB", "en-", "en-GBR", "12", "en-1B"] {
        let result = LanguageTag::parse(bad);
        assert!(
            matches!(result, Err(LicenseError::UnsupportedLocale(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn english_localizer_supports_english_variants_only() {
    let localizer = EnglishLocalizer;
    assert!(localizer.supports(&LanguageTag::parse("en").unwrap()));
    assert!(localizer.supports(&LanguageTag::parse("EN-us").unwrap()));
    assert!(!localizer.supports(&LanguageTag::parse("fr").unwrap()));
}

#[test]
fn render_substitutes_arguments() {
    let localizer = EnglishLocalizer;
    let text = localizer.render(
        MessageKey::FailedTimeLockExpired,
        &LanguageTag::english(),
        &["2024-01-01T00:00:00Z"],
    );
    assert_eq!(text, "The license expired on 2024-01-01T00:00:00Z.");
}

#[test]
fn format_template_handles_repeats_and_missing_arguments() {
    assert_eq!(format_template("{0}-{1}-{0}", &["a", "b"]), "a-b-a");
    assert_eq!(format_template("{0} and {1}", &["a"]), "a and {1}");
    assert_eq!(format_template("plain", &[]), "plain");
}

struct Pirate;

impl Localizer for Pirate {
    fn supports(&self, language: &LanguageTag) -> bool {
        language.as_str() == "en-PI"
    }

    fn template(&self, key: MessageKey, language: &LanguageTag) -> String {
        match key {
            MessageKey::FailedTimeLockExpired => "Yer license sank on {0}.".to_string(),
            other => EnglishLocalizer.template(other, language),
        }
    }
}

#[test]
fn custom_localizer_overrides_templates() {
    let text = Pirate.render(
        MessageKey::FailedTimeLockExpired,
        &LanguageTag::parse("en-PI").unwrap(),
        &["yesterday"],
    );
    assert_eq!(text, "Yer license sank on yesterday.");
}
