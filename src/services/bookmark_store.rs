//! Bookmark store.
//!
//! Implements `BookmarkStoreTrait`: owner-scoped select, insert and delete of
//! bookmark records, backed by SQLite via `rusqlite`. Every committed write is
//! published to the change feed, so the store is the single origin of change events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::services::change_feed::LocalChangeFeed;
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::StoreError;
use crate::types::event::StreamMessage;

/// Trait defining the persistent store boundary.
pub trait BookmarkStoreTrait: Send + Sync {
    /// Returns every record owned by `owner_id`, newest first.
    fn select_by_owner(&self, owner_id: &str) -> Result<Vec<Bookmark>, StoreError>;
    /// Inserts a record. The store assigns `id` and `created_at`.
    fn insert(&self, record: NewBookmark) -> Result<Bookmark, StoreError>;
    /// Deletes the record matching both `id` and `owner_id`.
    fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError>;
}

/// Bookmark store backed by a shared SQLite database.
pub struct SqliteBookmarkStore {
    db: Arc<Database>,
    feed: Arc<LocalChangeFeed>,
    offline: AtomicBool,
}

impl SqliteBookmarkStore {
    /// Creates a store writing to `db` and publishing changes to `feed`.
    pub fn new(db: Arc<Database>, feed: Arc<LocalChangeFeed>) -> Self {
        Self {
            db,
            feed,
            offline: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with `StoreError::Unreachable` until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn ensure_reachable(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("store is offline".to_string()));
        }
        Ok(())
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            owner_id: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl BookmarkStoreTrait for SqliteBookmarkStore {
    fn select_by_owner(&self, owner_id: &str) -> Result<Vec<Bookmark>, StoreError> {
        self.ensure_reachable()?;

        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, title, url, owner_id, created_at FROM bookmarks \
             WHERE owner_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![owner_id], Self::row_to_bookmark)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn insert(&self, record: NewBookmark) -> Result<Bookmark, StoreError> {
        self.ensure_reachable()?;
        if record.owner_id.is_empty() {
            return Err(StoreError::Rejected("record has no owner".to_string()));
        }

        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: record.title,
            url: record.url,
            owner_id: record.owner_id,
            created_at: Self::now_millis(),
        };

        self.db
            .connection()
            .execute(
                "INSERT INTO bookmarks (id, title, url, owner_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    bookmark.id,
                    bookmark.title,
                    bookmark.url,
                    bookmark.owner_id,
                    bookmark.created_at
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, msg)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::Rejected(msg.unwrap_or_else(|| err.to_string()))
                }
                other => StoreError::from(other),
            })?;

        tracing::debug!(id = %bookmark.id, owner_id = %bookmark.owner_id, "bookmark inserted");
        self.feed
            .publish(&bookmark.owner_id, StreamMessage::Insert(bookmark.clone()));
        Ok(bookmark)
    }

    fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        self.ensure_reachable()?;

        let affected = self.db.connection().execute(
            "DELETE FROM bookmarks WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;

        if affected == 0 {
            return Err(StoreError::Rejected(format!(
                "no bookmark {} owned by {}",
                id, owner_id
            )));
        }

        tracing::debug!(id, owner_id, "bookmark deleted");
        self.feed.publish(
            owner_id,
            StreamMessage::Delete {
                id: id.to_string(),
                owner_id: owner_id.to_string(),
            },
        );
        Ok(())
    }
}
