// Bookmark sync services
// Services implement the external boundaries: identity, change feed, persistent store, settings.

pub mod bookmark_store;
pub mod change_feed;
pub mod identity;
pub mod settings_engine;
