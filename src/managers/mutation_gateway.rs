//! Mutation Gateway.
//!
//! Executes add/delete intents against the store. The local collection is never
//! touched here: writes become visible only through the change feed.

use std::sync::Arc;

use crate::services::bookmark_store::BookmarkStoreTrait;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::{StoreError, SyncError};

#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn BookmarkStoreTrait>,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn BookmarkStoreTrait>) -> Self {
        Self { store }
    }

    /// Stores a new bookmark with trimmed `title` and `url`.
    ///
    /// Empty fields fail with `ValidationError` before the store is contacted.
    pub async fn add(&self, title: &str, url: &str, owner_id: &str) -> Result<Bookmark, SyncError> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() {
            return Err(SyncError::ValidationError("title is empty".to_string()));
        }
        if url.is_empty() {
            return Err(SyncError::ValidationError("url is empty".to_string()));
        }
        if owner_id.is_empty() {
            return Err(SyncError::Unauthenticated);
        }

        let record = NewBookmark {
            title: title.to_string(),
            url: url.to_string(),
            owner_id: owner_id.to_string(),
        };
        let store = Arc::clone(&self.store);
        let stored = tokio::task::spawn_blocking(move || store.insert(record))
            .await
            .map_err(|e| StoreError::Unreachable(format!("insert task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!(owner_id, error = %e, "add rejected");
                SyncError::from(e)
            })?;

        tracing::info!(id = %stored.id, owner_id, "bookmark added");
        Ok(stored)
    }

    /// Deletes the record `id` owned by `owner_id`.
    pub async fn remove(&self, id: &str, owner_id: &str) -> Result<(), SyncError> {
        if owner_id.is_empty() {
            return Err(SyncError::Unauthenticated);
        }

        let store = Arc::clone(&self.store);
        let (target, owner) = (id.to_string(), owner_id.to_string());
        tokio::task::spawn_blocking(move || store.delete(&target, &owner))
            .await
            .map_err(|e| StoreError::Unreachable(format!("delete task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!(id, owner_id, error = %e, "remove rejected");
                SyncError::from(e)
            })?;

        tracing::info!(id, owner_id, "bookmark removed");
        Ok(())
    }
}
