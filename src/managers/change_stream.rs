//! Change Stream Adapter.
//!
//! Opens one feed subscription per attached owner and runs a single
//! reconciliation task that owns the [`LocalCollection`] exclusively. Feed
//! messages arrive over a bounded channel; the task applies them in delivery
//! order and publishes each resulting snapshot through a `watch` channel.
//!
//! Ordering drift: inserts are prepended, never re-sorted. A record inserted
//! after the snapshot always ranks above every snapshot record, even when its
//! `created_at` is older (clock skew across sessions).

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::managers::collection_state::LocalCollection;
use crate::managers::snapshot_loader::SnapshotLoader;
use crate::services::change_feed::{ChangeFeedTrait, SubscriptionHandle};
use crate::types::bookmark::Bookmark;
use crate::types::errors::SyncError;
use crate::types::event::StreamMessage;
use crate::types::settings::SyncSettings;

type Published = Arc<Vec<Bookmark>>;

/// Liveness of one attach. Detach flips it and clears the view while holding
/// the lock; the reconciler publishes only while holding it and seeing `true`.
#[derive(Clone)]
struct Liveness(Arc<Mutex<bool>>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(true)))
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_live(&self) -> bool {
        *self.lock()
    }
}

/// Read side of the local collection, handed to whatever renders it.
#[derive(Clone)]
pub struct CollectionView {
    rx: watch::Receiver<Published>,
}

impl CollectionView {
    /// Ordered copy of the current contents.
    pub fn snapshot(&self) -> Vec<Bookmark> {
        self.rx.borrow().to_vec()
    }

    pub fn len(&self) -> usize {
        self.rx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.borrow().is_empty()
    }

    /// Waits for the next published change. Returns `false` once the stream is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Waits until `predicate` holds for the published contents and returns them.
    ///
    /// Returns `None` if the stream goes away first.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Option<Vec<Bookmark>>
    where
        F: FnMut(&[Bookmark]) -> bool,
    {
        loop {
            {
                let current = self.rx.borrow_and_update();
                if predicate(current.as_slice()) {
                    return Some(current.to_vec());
                }
            }
            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

struct ActiveStream {
    owner_id: String,
    handle: SubscriptionHandle,
    control: mpsc::Sender<StreamMessage>,
    live: Liveness,
    view_tx: Arc<watch::Sender<Published>>,
    task: JoinHandle<()>,
}

/// Attaches the local collection to the change feed.
pub struct ChangeStreamAdapter {
    feed: Arc<dyn ChangeFeedTrait>,
    loader: SnapshotLoader,
    channel_capacity: usize,
    resync_on_reconnect: bool,
    active: Option<ActiveStream>,
}

impl ChangeStreamAdapter {
    pub fn new(feed: Arc<dyn ChangeFeedTrait>, loader: SnapshotLoader, settings: &SyncSettings) -> Self {
        Self {
            feed,
            loader,
            channel_capacity: settings.feed_channel_capacity.max(1),
            resync_on_reconnect: settings.resync_on_reconnect,
            active: None,
        }
    }

    /// Subscribes for `owner_id` and hands `collection` to a new reconciliation task.
    ///
    /// `collection` must already hold the completed snapshot. Fails with
    /// `AlreadyAttached` while a previous attach is still active. Must be called
    /// from within a Tokio runtime.
    pub fn attach(
        &mut self,
        owner_id: &str,
        collection: LocalCollection,
    ) -> Result<CollectionView, SyncError> {
        if let Some(active) = &self.active {
            tracing::warn!(owner_id, attached = %active.owner_id, "double attach rejected");
            return Err(SyncError::AlreadyAttached(active.owner_id.clone()));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SyncError::FeedDisconnect(format!("no async runtime: {}", e)))?;

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let handle = self.feed.subscribe(owner_id, tx.clone())?;

        let (view_tx, view_rx) = watch::channel(Arc::new(collection.snapshot()));
        let view_tx = Arc::new(view_tx);
        let live = Liveness::new();

        let reconciler = Reconciler {
            owner_id: owner_id.to_string(),
            collection,
            loader: self.loader.clone(),
            resync_on_reconnect: self.resync_on_reconnect,
            live: live.clone(),
            view_tx: Arc::clone(&view_tx),
        };
        let task = runtime.spawn(reconciler.run(rx));

        tracing::info!(owner_id, subscription = handle.id(), "change stream attached");
        self.active = Some(ActiveStream {
            owner_id: owner_id.to_string(),
            handle,
            control: tx,
            live,
            view_tx,
            task,
        });
        Ok(CollectionView { rx: view_rx })
    }

    /// Releases the subscription and stops the reconciliation task.
    ///
    /// Synchronous and idempotent. After it returns no feed message can change
    /// the collection, and the published view is empty.
    pub fn detach(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        {
            let mut live = active.live.lock();
            *live = false;
            active.view_tx.send_replace(Arc::new(Vec::new()));
        }
        self.feed.unsubscribe(&active.handle);
        active.task.abort();
        tracing::info!(
            owner_id = %active.owner_id,
            subscription = active.handle.id(),
            "change stream detached"
        );
    }

    /// Reloads the snapshot inside the reconciliation task and waits for the outcome.
    ///
    /// Feed messages arriving meanwhile queue up and are applied after the new seed.
    pub async fn resync(&self) -> Result<usize, SyncError> {
        let control = match &self.active {
            Some(active) => active.control.clone(),
            None => return Err(SyncError::FeedDisconnect("change stream not attached".to_string())),
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        control
            .send(StreamMessage::Resync(reply_tx))
            .await
            .map_err(|_| SyncError::FeedDisconnect("change stream stopped".to_string()))?;
        reply_rx
            .await
            .map_err(|_| SyncError::FeedDisconnect("change stream stopped".to_string()))?
    }

    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }

    /// Owner of the active stream, if attached.
    pub fn owner_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.owner_id.as_str())
    }
}

impl Drop for ChangeStreamAdapter {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Single writer of the local collection.
struct Reconciler {
    owner_id: String,
    collection: LocalCollection,
    loader: SnapshotLoader,
    resync_on_reconnect: bool,
    live: Liveness,
    view_tx: Arc<watch::Sender<Published>>,
}

impl Reconciler {
    async fn run(mut self, mut inbox: mpsc::Receiver<StreamMessage>) {
        while let Some(message) = inbox.recv().await {
            if !self.live.is_live() {
                break;
            }
            let changed = match message {
                StreamMessage::Insert(bookmark) => self.apply_insert(bookmark),
                StreamMessage::Delete { id, owner_id } => self.apply_delete(&id, &owner_id),
                StreamMessage::Reconnected if self.resync_on_reconnect => {
                    tracing::info!(owner_id = %self.owner_id, "feed reconnected; reloading snapshot");
                    self.reload().await.is_ok()
                }
                StreamMessage::Reconnected => {
                    tracing::warn!(
                        owner_id = %self.owner_id,
                        "feed reconnected; events during the gap may be missing"
                    );
                    false
                }
                StreamMessage::Resync(reply) => {
                    let outcome = self.reload().await;
                    let changed = outcome.is_ok();
                    let _ = reply.send(outcome);
                    changed
                }
            };
            if changed && !self.publish() {
                break;
            }
        }
        tracing::debug!(owner_id = %self.owner_id, "reconciliation task finished");
    }

    /// Publishes the collection unless the stream was detached. Returns liveness.
    fn publish(&self) -> bool {
        let live = self.live.lock();
        if *live {
            self.view_tx.send_replace(Arc::new(self.collection.snapshot()));
        }
        *live
    }

    fn apply_insert(&mut self, bookmark: Bookmark) -> bool {
        if bookmark.owner_id != self.owner_id {
            tracing::debug!(id = %bookmark.id, "ignoring insert for another owner");
            return false;
        }
        let id = bookmark.id.clone();
        let changed = self.collection.prepend(bookmark);
        tracing::debug!(id = %id, changed, "insert applied");
        changed
    }

    fn apply_delete(&mut self, id: &str, owner_id: &str) -> bool {
        if owner_id != self.owner_id {
            tracing::debug!(id, "ignoring delete for another owner");
            return false;
        }
        let changed = self.collection.remove_by_id(id);
        tracing::debug!(id, changed, "delete applied");
        changed
    }

    async fn reload(&mut self) -> Result<usize, SyncError> {
        match self.loader.load(&self.owner_id).await {
            Ok(records) => {
                self.collection.seed(records);
                Ok(self.collection.len())
            }
            Err(e) => {
                tracing::warn!(owner_id = %self.owner_id, error = %e, "snapshot reload failed");
                Err(e)
            }
        }
    }
}
