//! Unit tests for the LocalizationEngine public API.
//!
//! These tests exercise the built-in catalogs, catalog loading from disk,
//! parameter interpolation, and fallback behavior for unsupported locales.

use std::collections::HashMap;
use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use marksync::services::localization_engine::{
    LocalizationEngine, LocalizationEngineTrait, DEFAULT_LOCALE, UNTITLED_KEY,
};

/// Writes an extra catalog and an override for `en` into `dir`.
fn setup_locales(dir: &std::path::Path) {
    let en = serde_json::json!({
        "bookmark": { "untitled": "No title" },
        "greeting": "Hello, {name}!",
        "multi_param": "{greeting}, welcome to {place}!"
    });
    let fr = serde_json::json!({
        "bookmark": { "untitled": "Sans titre" }
    });

    fs::write(dir.join("en.json"), serde_json::to_string_pretty(&en).unwrap()).unwrap();
    fs::write(dir.join("fr.json"), serde_json::to_string_pretty(&fr).unwrap()).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

#[rstest]
#[case("en", "Untitled")]
#[case("de", "Unbenannt")]
#[case("ru", "Без названия")]
fn test_builtin_untitled_titles(#[case] locale: &str, #[case] expected: &str) {
    let engine = LocalizationEngine::for_locale(locale).unwrap();
    assert_eq!(engine.get_locale(), locale);
    assert_eq!(engine.untitled(), expected);
}

#[test]
fn test_unknown_locale_falls_back_to_default() {
    let engine = LocalizationEngine::for_locale("xx").unwrap();
    assert_eq!(engine.get_locale(), DEFAULT_LOCALE);
    assert_eq!(engine.untitled(), "Untitled");
}

/// When `set_locale` is called with an unsupported locale, it returns an
/// error and the engine stays on the previous locale.
#[test]
fn test_unsupported_locale_returns_error() {
    let mut engine = LocalizationEngine::new().unwrap();
    engine.set_locale("de").unwrap();

    assert!(engine.set_locale("fr").is_err());
    assert_eq!(engine.get_locale(), "de");
}

#[test]
fn test_missing_key_returns_key() {
    let engine = LocalizationEngine::new().unwrap();
    assert_eq!(engine.t("no.such.key", None), "no.such.key");
}

#[test]
fn test_load_dir_adds_and_overrides_catalogs() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = LocalizationEngine::new().unwrap();

    assert_eq!(engine.load_dir(dir.path()).unwrap(), 2);
    assert_eq!(engine.get_available_locales(), vec!["de", "en", "fr", "ru"]);
    assert_eq!(engine.t(UNTITLED_KEY, None), "No title");

    engine.set_locale("fr").unwrap();
    assert_eq!(engine.untitled(), "Sans titre");
}

/// Keys absent from the active catalog come from the default locale.
#[test]
fn test_key_missing_in_locale_uses_default() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = LocalizationEngine::new().unwrap();
    engine.load_dir(dir.path()).unwrap();
    engine.set_locale("fr").unwrap();

    let mut params = HashMap::new();
    params.insert("name".to_string(), "World".to_string());
    assert_eq!(engine.t("greeting", Some(&params)), "Hello, World!");
}

#[test]
fn test_parameter_interpolation_multiple() {
    let dir = TempDir::new().unwrap();
    setup_locales(dir.path());
    let mut engine = LocalizationEngine::new().unwrap();
    engine.load_dir(dir.path()).unwrap();

    let mut params = HashMap::new();
    params.insert("greeting".to_string(), "Hi".to_string());
    params.insert("place".to_string(), "Marksync".to_string());

    assert_eq!(
        engine.t("multi_param", Some(&params)),
        "Hi, welcome to Marksync!"
    );
}

#[test]
fn test_malformed_catalog_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xx.json"), "{ broken").unwrap();
    let mut engine = LocalizationEngine::new().unwrap();
    assert!(engine.load_dir(dir.path()).is_err());
}
