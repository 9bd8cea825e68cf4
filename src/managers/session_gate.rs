//! Session Gate.
//!
//! Resolves the current identity once, before any data operation runs.

use std::sync::Arc;

use crate::services::identity::IdentityProviderTrait;
use crate::types::errors::SyncError;
use crate::types::session::Session;

/// Resolves and caches the session for one view lifetime.
pub struct SessionGate {
    identity: Arc<dyn IdentityProviderTrait>,
    resolved: Option<Option<Session>>,
}

impl SessionGate {
    pub fn new(identity: Arc<dyn IdentityProviderTrait>) -> Self {
        Self {
            identity,
            resolved: None,
        }
    }

    /// Returns the session, or `Unauthenticated` when none exists.
    ///
    /// The provider is consulted on the first call only; later calls return the
    /// cached outcome, including a cached `Unauthenticated`.
    pub fn resolve(&mut self) -> Result<Session, SyncError> {
        let identity = &self.identity;
        let outcome = self.resolved.get_or_insert_with(|| {
            let session = identity.current_session();
            match &session {
                Some(s) => tracing::info!(owner_id = %s.owner_id, "session resolved"),
                None => tracing::info!("no session; redirecting"),
            }
            session
        });
        outcome.clone().ok_or(SyncError::Unauthenticated)
    }

    /// The resolved session, if `resolve` succeeded earlier.
    pub fn session(&self) -> Option<&Session> {
        self.resolved.as_ref().and_then(|s| s.as_ref())
    }

    /// Ends the view lifetime. Every later `resolve` is `Unauthenticated`,
    /// whatever the provider reports.
    pub fn invalidate(&mut self) {
        if let Some(Some(session)) = self.resolved.replace(None) {
            tracing::debug!(owner_id = %session.owner_id, "session gate closed");
        }
    }
}
