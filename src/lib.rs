//! Bookmark sync: a single-user bookmark manager core that keeps a local,
//! owner-scoped collection consistent with an initial snapshot plus a live
//! stream of insert/delete events.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod dashboard;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
