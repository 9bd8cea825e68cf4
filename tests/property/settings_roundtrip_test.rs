//! Property-based tests for SyncSettings serialization round-trip.
//!
//! These tests verify that SyncSettings can be serialized to JSON and read
//! back through the SettingsEngine without data loss for arbitrary valid inputs.

use bookmark_sync::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use bookmark_sync::types::settings::SyncSettings;
use proptest::prelude::*;

fn arb_settings() -> impl Strategy<Value = SyncSettings> {
    (
        proptest::option::of("/[a-z]{1,10}/[a-z]{1,10}\\.db"),
        1usize..4096,
        any::<bool>(),
        prop_oneof![
            Just("info".to_string()),
            Just("debug".to_string()),
            Just("bookmark_sync=trace,warn".to_string()),
        ],
    )
        .prop_map(
            |(database_path, feed_channel_capacity, resync_on_reconnect, log_filter)| SyncSettings {
                database_path,
                feed_channel_capacity,
                resync_on_reconnect,
                log_filter,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn settings_json_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: SyncSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn settings_file_roundtrip(settings in arb_settings()) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sync.json");
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let mut engine = SettingsEngine::new(Some(path.to_string_lossy().to_string()));
        let loaded = engine.load().unwrap();
        prop_assert_eq!(loaded, settings);
    }
}
