use serde::{Deserialize, Serialize};

/// A saved bookmark as held by the store.
///
/// Records are immutable once created; the only mutation is deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub owner_id: String,
    /// UNIX timestamp in milliseconds, assigned by the store.
    pub created_at: i64,
}

/// Insert payload for the store. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub owner_id: String,
}
