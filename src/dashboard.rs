//! Dashboard view lifecycle.
//!
//! Drives the core in order: Session Gate resolves identity, Snapshot Loader
//! seeds the collection, Change Stream Adapter attaches. Afterwards the change
//! feed is the only path by which the collection changes.

use crate::app::SyncClient;
use crate::managers::change_stream::{ChangeStreamAdapter, CollectionView};
use crate::managers::collection_state::LocalCollection;
use crate::managers::mutation_gateway::MutationGateway;
use crate::managers::session_gate::SessionGate;
use crate::managers::snapshot_loader::SnapshotLoader;
use crate::services::identity::IdentityProviderTrait;
use crate::types::bookmark::Bookmark;
use crate::types::errors::SyncError;
use crate::types::session::Session;
use crate::types::settings::SyncSettings;

use std::sync::Arc;

/// One consuming view of the owner's bookmarks.
///
/// Dropping the dashboard tears it down.
pub struct Dashboard {
    identity: Arc<dyn IdentityProviderTrait>,
    gate: SessionGate,
    loader: SnapshotLoader,
    stream: ChangeStreamAdapter,
    gateway: MutationGateway,
    view: Option<CollectionView>,
    last_load_error: Option<SyncError>,
}

impl Dashboard {
    pub fn new(client: &SyncClient, settings: &SyncSettings) -> Self {
        let loader = SnapshotLoader::new(Arc::clone(&client.store));
        Self {
            identity: Arc::clone(&client.identity),
            gate: SessionGate::new(Arc::clone(&client.identity)),
            stream: ChangeStreamAdapter::new(Arc::clone(&client.feed), loader.clone(), settings),
            loader,
            gateway: MutationGateway::new(Arc::clone(&client.store)),
            view: None,
            last_load_error: None,
        }
    }

    /// Resolves the session, loads the snapshot, then attaches the change stream.
    ///
    /// `Unauthenticated` means the caller must navigate away; nothing was fetched.
    /// A failed snapshot is not fatal: the view starts empty and
    /// [`retry_snapshot`](Self::retry_snapshot) may be called.
    pub async fn open(&mut self) -> Result<CollectionView, SyncError> {
        let session = self.gate.resolve()?;
        if self.stream.is_attached() {
            return Err(SyncError::AlreadyAttached(session.owner_id));
        }

        let mut collection = LocalCollection::new();
        match self.loader.load(&session.owner_id).await {
            Ok(records) => {
                collection.seed(records);
                self.last_load_error = None;
            }
            Err(e) => {
                tracing::warn!(owner_id = %session.owner_id, error = %e, "snapshot failed; starting empty");
                self.last_load_error = Some(e);
            }
        }

        let view = self.stream.attach(&session.owner_id, collection)?;
        self.view = Some(view.clone());
        Ok(view)
    }

    /// Reloads the snapshot after a failed (or stale) load.
    ///
    /// Returns the number of records now held.
    pub async fn retry_snapshot(&mut self) -> Result<usize, SyncError> {
        self.owner()?;
        let outcome = self.stream.resync().await;
        self.last_load_error = outcome.as_ref().err().cloned();
        outcome
    }

    /// Stores a new bookmark. It appears once its insert event arrives.
    pub async fn add(&self, title: &str, url: &str) -> Result<Bookmark, SyncError> {
        let owner = self.owner()?;
        self.gateway.add(title, url, &owner).await
    }

    /// Deletes a bookmark. It disappears once its delete event arrives.
    pub async fn remove(&self, id: &str) -> Result<(), SyncError> {
        let owner = self.owner()?;
        self.gateway.remove(id, &owner).await
    }

    /// Current contents, newest first. Empty before `open` and after teardown.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.view.as_ref().map(CollectionView::snapshot).unwrap_or_default()
    }

    pub fn view(&self) -> Option<CollectionView> {
        self.view.clone()
    }

    pub fn session(&self) -> Option<&Session> {
        self.gate.session()
    }

    pub fn last_load_error(&self) -> Option<&SyncError> {
        self.last_load_error.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_attached()
    }

    /// Tears the view down, then signs out at the identity provider.
    pub fn sign_out(&mut self) {
        self.teardown();
        self.identity.sign_out();
    }

    /// Releases the subscription, clears the collection and closes the gate.
    ///
    /// Terminal and idempotent: a torn-down dashboard never opens again, so a
    /// new session always gets a new `Dashboard`.
    pub fn teardown(&mut self) {
        self.stream.detach();
        self.gate.invalidate();
        self.view = None;
    }

    fn owner(&self) -> Result<String, SyncError> {
        match (self.gate.session(), self.stream.is_attached()) {
            (Some(session), true) => Ok(session.owner_id.clone()),
            _ => Err(SyncError::Unauthenticated),
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}
