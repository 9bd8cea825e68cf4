//! App Core for the bookmark sync client.
//!
//! Builds the explicitly constructed client (store, feed, identity) that every
//! core component receives, and holds the settings and the active dashboard.

use std::sync::Arc;

use crate::dashboard::Dashboard;
use crate::database::connection::Database;
use crate::services::bookmark_store::{BookmarkStoreTrait, SqliteBookmarkStore};
use crate::services::change_feed::{ChangeFeedTrait, LocalChangeFeed};
use crate::services::identity::{IdentityProviderTrait, LocalIdentityProvider};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::SettingsError;
use crate::types::settings::SyncSettings;

/// Handles to the three external collaborators, injected into the core.
#[derive(Clone)]
pub struct SyncClient {
    pub store: Arc<dyn BookmarkStoreTrait>,
    pub feed: Arc<dyn ChangeFeedTrait>,
    pub identity: Arc<dyn IdentityProviderTrait>,
}

impl SyncClient {
    pub fn new(
        store: Arc<dyn BookmarkStoreTrait>,
        feed: Arc<dyn ChangeFeedTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
    ) -> Self {
        Self {
            store,
            feed,
            identity,
        }
    }
}

/// Central application struct wiring the local collaborators together.
///
/// The concrete handles are kept next to the trait-object client so the RPC
/// layer can reach sign-in and transport controls the core never sees.
pub struct App {
    /// Effective settings; new dashboards are built from these.
    pub settings: SyncSettings,
    pub settings_engine: SettingsEngine,
    pub feed: Arc<LocalChangeFeed>,
    pub store: Arc<SqliteBookmarkStore>,
    pub identity: Arc<LocalIdentityProvider>,
    pub client: SyncClient,
    pub dashboard: Option<Dashboard>,
}

impl App {
    /// Creates a new App with the given settings.
    ///
    /// `settings.database_path` selects an on-disk database; `None` keeps it in memory.
    pub fn new(settings: SyncSettings, settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(match &settings.database_path {
            Some(path) => Database::open(path)?,
            None => Database::open_in_memory()?,
        });

        let feed = Arc::new(LocalChangeFeed::new());
        let store = Arc::new(SqliteBookmarkStore::new(db, Arc::clone(&feed)));
        let identity = Arc::new(LocalIdentityProvider::new());

        let client = SyncClient::new(
            store.clone() as Arc<dyn BookmarkStoreTrait>,
            feed.clone() as Arc<dyn ChangeFeedTrait>,
            identity.clone() as Arc<dyn IdentityProviderTrait>,
        );

        tracing::info!(
            database = settings.database_path.as_deref().unwrap_or(":memory:"),
            "bookmark sync initialized"
        );

        Ok(Self {
            settings,
            settings_engine,
            feed,
            store,
            identity,
            client,
            dashboard: None,
        })
    }

    /// Updates one setting through the settings engine and persists it.
    ///
    /// Stream settings apply from the next dashboard on; `database_path` only
    /// on the next start.
    pub fn update_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.settings_engine.set_value(key, value)?;
        self.settings = self.settings_engine.get_settings().clone();
        tracing::info!(key, "setting updated");
        Ok(())
    }

    /// Creates a fresh dashboard, tearing down any previous one.
    pub fn new_dashboard(&mut self) -> &mut Dashboard {
        if let Some(mut old) = self.dashboard.take() {
            old.teardown();
        }
        self.dashboard.insert(Dashboard::new(&self.client, &self.settings))
    }

    /// Tears down the active dashboard, releasing its subscription.
    pub fn shutdown(&mut self) {
        if let Some(mut dashboard) = self.dashboard.take() {
            dashboard.teardown();
        }
        tracing::info!("bookmark sync shut down");
    }
}
