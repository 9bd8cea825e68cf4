//! Snapshot Loader.
//!
//! Performs the full owner-scoped fetch that seeds the local collection.

use std::sync::Arc;

use crate::services::bookmark_store::BookmarkStoreTrait;
use crate::types::bookmark::Bookmark;
use crate::types::errors::{StoreError, SyncError};

/// Loads the owner's bookmarks, newest first.
#[derive(Clone)]
pub struct SnapshotLoader {
    store: Arc<dyn BookmarkStoreTrait>,
}

impl SnapshotLoader {
    pub fn new(store: Arc<dyn BookmarkStoreTrait>) -> Self {
        Self { store }
    }

    /// Fetches every record owned by `owner_id`, sorted by `created_at` descending.
    ///
    /// The store call runs on the blocking pool. Records of other owners are
    /// dropped even if the store returns them.
    pub async fn load(&self, owner_id: &str) -> Result<Vec<Bookmark>, SyncError> {
        let store = Arc::clone(&self.store);
        let owner = owner_id.to_string();
        let mut records = tokio::task::spawn_blocking(move || store.select_by_owner(&owner))
            .await
            .map_err(|e| StoreError::Unreachable(format!("snapshot task failed: {}", e)))??;

        let fetched = records.len();
        records.retain(|b| b.owner_id == owner_id);
        if records.len() != fetched {
            tracing::warn!(
                owner_id,
                dropped = fetched - records.len(),
                "store returned foreign records"
            );
        }
        // stable: ties keep the store's order
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::info!(owner_id, count = records.len(), "snapshot loaded");
        Ok(records)
    }
}
