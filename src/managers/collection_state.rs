//! Local Collection State.
//!
//! The in-memory ordered set of bookmarks rendered by the view. Seeded from the
//! snapshot (newest first), then mutated only by change events.

use crate::types::bookmark::Bookmark;

/// Ordered, id-unique collection of bookmarks.
///
/// Records inserted after the seed are prepended rather than re-sorted by
/// `created_at`, so a late insert always ranks above every seeded record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalCollection {
    items: Vec<Bookmark>,
}

impl LocalCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with `records`, keeping the first occurrence of each id.
    pub fn seed(&mut self, records: Vec<Bookmark>) {
        self.items.clear();
        for record in records {
            if !self.contains(&record.id) {
                self.items.push(record);
            }
        }
    }

    /// Puts `bookmark` at the head unless its id is already present.
    ///
    /// Returns `true` when the collection changed.
    pub fn prepend(&mut self, bookmark: Bookmark) -> bool {
        if self.contains(&bookmark.id) {
            return false;
        }
        self.items.insert(0, bookmark);
        true
    }

    /// Removes the record with `id`. Returns `true` when one was present.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        self.items.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|b| b.id == id)
    }

    /// Ordered copy of the contents for rendering.
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
