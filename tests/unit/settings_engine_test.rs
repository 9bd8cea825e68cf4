//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, validation and reset behavior.

use bookmark_sync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_sync::types::errors::SettingsError;
use bookmark_sync::types::settings::SyncSettings;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("nested")
        .join("bookmark-sync.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, SyncSettings::default());
    assert_eq!(settings.feed_channel_capacity, 256);
    assert!(settings.resync_on_reconnect);
}

#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("resync_on_reconnect", serde_json::Value::Bool(false))
            .unwrap();
        engine
            .set_value("database_path", serde_json::json!("/var/lib/bookmarks.db"))
            .unwrap();
    }

    let mut engine2 = engine_in_temp(&dir);
    let loaded = engine2.load().unwrap();
    assert!(!loaded.resync_on_reconnect);
    assert_eq!(loaded.database_path.as_deref(), Some("/var/lib/bookmarks.db"));
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("log_filter", serde_json::json!("debug")).unwrap();

    engine.reset().unwrap();
    assert_eq!(*engine.get_settings(), SyncSettings::default());

    let mut engine2 = engine_in_temp(&dir);
    assert_eq!(engine2.load().unwrap(), SyncSettings::default());
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    let result = engine.load();
    assert!(matches!(result, Err(SettingsError::SerializationError(_))));
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"feed_channel_capacity": 8}"#).unwrap();

    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    let loaded = engine.load().unwrap();
    assert_eq!(loaded.feed_channel_capacity, 8);
    assert_eq!(loaded.log_filter, "info");
}

#[test]
fn test_file_with_invalid_values_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zero.json");
    std::fs::write(&path, r#"{"feed_channel_capacity": 0}"#).unwrap();

    let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
    assert!(matches!(engine.load(), Err(SettingsError::InvalidValue(_))));
}
