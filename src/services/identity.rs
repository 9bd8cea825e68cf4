//! Identity provider boundary.
//!
//! The challenge/redirect sign-in flow lives outside this crate; the core only
//! asks for the current session and signals sign-out.

use std::sync::{Mutex, MutexGuard};

use crate::types::errors::SyncError;
use crate::types::session::Session;

/// Trait defining the session boundary.
pub trait IdentityProviderTrait: Send + Sync {
    fn current_session(&self) -> Option<Session>;
    fn sign_out(&self);
}

/// In-memory identity provider holding at most one session.
#[derive(Default)]
pub struct LocalIdentityProvider {
    session: Mutex<Option<Session>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Completes a sign-in for `owner_id`, replacing any previous session.
    pub fn sign_in(&self, owner_id: &str, email: &str) -> Result<Session, SyncError> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(SyncError::ValidationError("owner id is empty".to_string()));
        }
        let session = Session::new(owner_id, email.trim());
        *self.slot() = Some(session.clone());
        tracing::info!(owner_id, "signed in");
        Ok(session)
    }
}

impl IdentityProviderTrait for LocalIdentityProvider {
    fn current_session(&self) -> Option<Session> {
        self.slot().clone()
    }

    fn sign_out(&self) {
        if let Some(session) = self.slot().take() {
            tracing::info!(owner_id = %session.owner_id, "signed out");
        }
    }
}
