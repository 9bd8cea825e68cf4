//! Unit tests for the session gate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bookmark_sync::managers::session_gate::SessionGate;
use bookmark_sync::services::identity::{IdentityProviderTrait, LocalIdentityProvider};
use bookmark_sync::types::errors::SyncError;
use bookmark_sync::types::session::Session;

/// Identity provider double counting how often it is consulted.
struct CountingProvider {
    session: Option<Session>,
    calls: AtomicUsize,
}

impl IdentityProviderTrait for CountingProvider {
    fn current_session(&self) -> Option<Session> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.session.clone()
    }

    fn sign_out(&self) {}
}

#[test]
fn test_resolve_returns_signed_in_session() {
    let provider = Arc::new(LocalIdentityProvider::new());
    provider.sign_in("alice", "alice@example.com").unwrap();

    let mut gate = SessionGate::new(provider);
    let session = gate.resolve().unwrap();
    assert_eq!(session.owner_id, "alice");
    assert_eq!(session.display_label, "alice@example.com");
    assert_eq!(gate.session(), Some(&session));
}

#[test]
fn test_resolve_without_session_is_unauthenticated() {
    let provider = Arc::new(LocalIdentityProvider::new());
    let mut gate = SessionGate::new(provider);
    assert_eq!(gate.resolve(), Err(SyncError::Unauthenticated));
    assert!(gate.session().is_none());
}

#[test]
fn test_provider_is_consulted_once() {
    let provider = Arc::new(CountingProvider {
        session: Some(Session::new("alice", "alice@example.com")),
        calls: AtomicUsize::new(0),
    });
    let mut gate = SessionGate::new(provider.clone());

    for _ in 0..3 {
        gate.resolve().unwrap();
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unauthenticated_outcome_is_cached() {
    let provider = Arc::new(LocalIdentityProvider::new());
    let mut gate = SessionGate::new(provider.clone());
    assert!(gate.resolve().is_err());

    // a later sign-in needs a new view lifetime to be observed
    provider.sign_in("alice", "alice@example.com").unwrap();
    assert_eq!(gate.resolve(), Err(SyncError::Unauthenticated));
}

#[test]
fn test_sign_in_rejects_blank_owner() {
    let provider = LocalIdentityProvider::new();
    assert!(matches!(
        provider.sign_in("   ", "x@example.com"),
        Err(SyncError::ValidationError(_))
    ));
    assert!(provider.current_session().is_none());
}

#[test]
fn test_sign_out_clears_provider_session() {
    let provider = LocalIdentityProvider::new();
    provider.sign_in("alice", "alice@example.com").unwrap();
    provider.sign_out();
    assert!(provider.current_session().is_none());
}

#[test]
fn test_invalidate_closes_the_gate_for_good() {
    let provider = Arc::new(CountingProvider {
        session: Some(Session::new("alice", "alice@example.com")),
        calls: AtomicUsize::new(0),
    });
    let mut gate = SessionGate::new(provider.clone());
    gate.resolve().unwrap();

    gate.invalidate();
    assert!(gate.session().is_none());
    // the provider still reports alice, but the gate no longer asks
    assert_eq!(gate.resolve(), Err(SyncError::Unauthenticated));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_invalidate_before_resolve_blocks_resolution() {
    let provider = Arc::new(LocalIdentityProvider::new());
    provider.sign_in("alice", "alice@example.com").unwrap();
    let mut gate = SessionGate::new(provider);

    gate.invalidate();
    assert_eq!(gate.resolve(), Err(SyncError::Unauthenticated));
}
