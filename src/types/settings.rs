use serde::{Deserialize, Serialize};

/// Runtime configuration for the sync client and its local collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Path of the SQLite file backing the local store. `None` keeps it in memory.
    pub database_path: Option<String>,
    /// Capacity of the bounded channel between the feed and the reconciliation task.
    pub feed_channel_capacity: usize,
    /// Reload the snapshot when the feed reports a reconnect.
    pub resync_on_reconnect: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            feed_channel_capacity: 256,
            resync_on_reconnect: true,
            log_filter: "info".to_string(),
        }
    }
}
