//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, persistence, partial files and malformed input.

use std::fs;
use std::path::PathBuf;

use marksync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use marksync::types::errors::SettingsError;
use marksync::types::settings::StoreSettings;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

/// When no config file exists on disk, `load()` must return the built-in
/// defaults so the store can open without prior configuration.
#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, StoreSettings::default());
    assert_eq!(settings.locale, "en");
    assert!(settings.wal_journal);
    assert_eq!(settings.notification_capacity, 64);
}

/// `update` writes through, so a second engine on the same file reads it back.
#[test]
fn test_update_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        let settings = StoreSettings {
            locale: "ru".to_string(),
            database_path: Some("/tmp/other.db".to_string()),
            ..StoreSettings::default()
        };
        engine.update(settings).unwrap();
    }

    let mut engine2 = engine_in_temp(&dir);
    let loaded = engine2.load().unwrap();
    assert_eq!(loaded.locale, "ru");
    assert_eq!(loaded.database_path.as_deref(), Some("/tmp/other.db"));
    assert_eq!(loaded.database_file(), PathBuf::from("/tmp/other.db"));
}

/// Keys missing from the file take their default values.
#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in_temp(&dir);
    fs::write(engine.get_config_path(), r#"{"locale":"de"}"#).unwrap();

    let mut engine = engine_in_temp(&dir);
    let loaded = engine.load().unwrap();
    assert_eq!(loaded.locale, "de");
    assert_eq!(loaded.notification_capacity, 64);
    assert!(loaded.database_path.is_none());
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    fs::write(engine.get_config_path(), "{ not json").unwrap();

    assert!(matches!(engine.load(), Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a/b/settings.json");
    let engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));

    engine.save().unwrap();
    assert!(path.exists());
}

#[test]
fn test_default_database_path_is_in_data_dir() {
    let path = StoreSettings::default().database_file();
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("marksync.db"));
}
