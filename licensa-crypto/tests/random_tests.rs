use licensa_crypto::{CharacterSets, CryptoError, new_key_from_alphabet, new_string_key};
use std::collections::HashSet;

#[test]
fn numeric_uppercase_key_uses_only_those_ranges() {
    let key = new_string_key(16, CharacterSets::NUMERIC | CharacterSets::UPPERCASE).unwrap();
    assert_eq!(key.chars().count(), 16);
    assert!(key.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[test]
fn each_flag_contributes_its_range() {
    assert_eq!(CharacterSets::NUMERIC.alphabet().len(), 10);
    assert_eq!(CharacterSets::LOWERCASE.alphabet().len(), 26);
    assert_eq!(CharacterSets::UPPERCASE.alphabet().len(), 26);
    assert_eq!(CharacterSets::PUNCTUATION.alphabet().len(), 28);
    assert_eq!(CharacterSets::all().alphabet().len(), 90);
}

#[test]
fn punctuation_key_stays_in_range() {
    let key = new_string_key(64, CharacterSets::PUNCTUATION).unwrap();
    assert!(CharacterSets::PUNCTUATION.admits(&key));
    assert!(!key.chars().any(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn empty_character_set_is_rejected() {
    let result = new_string_key(8, CharacterSets::empty());
    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
}

#[test]
fn explicit_alphabet() {
    let key = new_key_from_alphabet(32, &['x', 'y']).unwrap();
    assert!(key.chars().all(|c| c == 'x' || c == 'y'));

    let result = new_key_from_alphabet(4, &[]);
    assert!(matches!(result, Err(CryptoError::InvalidArgument(_))));
}

#[test]
fn zero_length_key_is_empty() {
    assert_eq!(new_string_key(0, CharacterSets::NUMERIC).unwrap(), "");
}

#[test]
fn keys_cover_the_alphabet() {
    let key = new_string_key(2000, CharacterSets::NUMERIC).unwrap();
    let seen: HashSet<char> = key.chars().collect();
    assert_eq!(seen.len(), 10);
}

#[test]
fn admits_rejects_foreign_characters() {
    assert!(CharacterSets::LOWERCASE.admits("abc"));
    assert!(!CharacterSets::LOWERCASE.admits("abC"));
    assert!(!CharacterSets::NUMERIC.admits("12 3"));
}

#[test]
fn character_sets_serde_roundtrip() {
    let sets = CharacterSets::NUMERIC | CharacterSets::UPPERCASE;
    let json = serde_json::to_string(&sets).unwrap();
    let parsed: CharacterSets = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, sets);
}
