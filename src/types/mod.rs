// Bookmark sync shared type definitions
// Each submodule defines types used across the stores, feed and core components.

pub mod bookmark;
pub mod errors;
pub mod event;
pub mod session;
pub mod settings;
