//! Change feed for bookmark records.
//!
//! Implements `ChangeFeedTrait`: owner-filtered delivery of insert/delete
//! notifications into bounded channel sinks. `LocalChangeFeed` is the in-process
//! feed the SQLite store publishes into after each committed write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::types::errors::FeedError;
use crate::types::event::StreamMessage;

/// Opaque handle of an open subscription. Pass it back to `unsubscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    owner_id: String,
}

impl SubscriptionHandle {
    pub fn new(id: u64, owner_id: impl Into<String>) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Trait defining the change-feed boundary.
pub trait ChangeFeedTrait: Send + Sync {
    /// Opens a subscription delivering `Insert`/`Delete` messages for `owner_id` into `sink`.
    fn subscribe(
        &self,
        owner_id: &str,
        sink: mpsc::Sender<StreamMessage>,
    ) -> Result<SubscriptionHandle, FeedError>;
    /// Closes a subscription. Unknown handles are ignored.
    fn unsubscribe(&self, handle: &SubscriptionHandle);
}

struct Subscriber {
    owner_id: String,
    sink: mpsc::Sender<StreamMessage>,
}

/// In-process change feed with server-side owner filtering.
pub struct LocalChangeFeed {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    connected: AtomicBool,
}

impl Default for LocalChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalChangeFeed {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<u64, Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers `message` to every subscription opened for `owner_id`.
    ///
    /// Returns the number of sinks that accepted the message. While disconnected
    /// nothing is delivered and the message is lost.
    pub fn publish(&self, owner_id: &str, message: StreamMessage) -> usize {
        if !self.connected.load(Ordering::SeqCst) {
            tracing::warn!(owner_id, kind = message.kind(), "feed disconnected; event lost");
            return 0;
        }

        let mut registry = self.registry();
        let targets: Vec<u64> = registry
            .iter()
            .filter(|(_, sub)| sub.owner_id == owner_id)
            .map(|(id, _)| *id)
            .collect();

        let mut delivered = 0;
        for id in targets {
            let Some(payload) = clone_change(&message) else { break };
            let Some(sub) = registry.get(&id) else { continue };

            match sub.sink.try_send(payload) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(dropped)) => {
                    tracing::warn!(
                        subscription = id,
                        kind = dropped.kind(),
                        "subscriber channel full; event dropped"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(subscription = id, "subscriber gone; pruning");
                    registry.remove(&id);
                }
            }
        }
        delivered
    }

    /// Simulates a transport drop. Events published until `reconnect` are lost.
    pub fn disconnect(&self) {
        tracing::info!("change feed disconnected");
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Restores the transport and notifies every live subscription.
    pub fn reconnect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        let registry = self.registry();
        tracing::info!(subscriptions = registry.len(), "change feed reconnected");
        for (id, sub) in registry.iter() {
            if let Err(e) = sub.sink.try_send(StreamMessage::Reconnected) {
                tracing::warn!(subscription = id, error = %e, "failed to deliver reconnect notice");
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of open subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.registry().len()
    }
}

/// Feed messages fan out to several sinks; only data-carrying variants are clonable.
fn clone_change(message: &StreamMessage) -> Option<StreamMessage> {
    match message {
        StreamMessage::Insert(b) => Some(StreamMessage::Insert(b.clone())),
        StreamMessage::Delete { id, owner_id } => Some(StreamMessage::Delete {
            id: id.clone(),
            owner_id: owner_id.clone(),
        }),
        StreamMessage::Reconnected => Some(StreamMessage::Reconnected),
        StreamMessage::Resync(_) => None,
    }
}

impl ChangeFeedTrait for LocalChangeFeed {
    fn subscribe(
        &self,
        owner_id: &str,
        sink: mpsc::Sender<StreamMessage>,
    ) -> Result<SubscriptionHandle, FeedError> {
        if owner_id.is_empty() {
            return Err(FeedError::SubscribeFailed("owner id is empty".to_string()));
        }
        if sink.is_closed() {
            return Err(FeedError::SubscribeFailed("sink already closed".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.registry().insert(
            id,
            Subscriber {
                owner_id: owner_id.to_string(),
                sink,
            },
        );
        tracing::debug!(subscription = id, owner_id, "subscription opened");
        Ok(SubscriptionHandle::new(id, owner_id))
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) {
        if self.registry().remove(&handle.id).is_some() {
            tracing::debug!(subscription = handle.id, "subscription closed");
        }
    }
}
