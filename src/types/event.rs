use super::bookmark::Bookmark;

/// Messages consumed by the reconciliation task of the change stream.
///
/// The feed produces `Insert`, `Delete` and `Reconnected`; `Resync` is only sent
/// by the owning view when it wants the collection reloaded from the store.
#[derive(Debug)]
pub enum StreamMessage {
    Insert(Bookmark),
    Delete { id: String, owner_id: String },
    Reconnected,
    Resync(tokio::sync::oneshot::Sender<Result<usize, super::errors::SyncError>>),
}

impl StreamMessage {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::Insert(_) => "insert",
            StreamMessage::Delete { .. } => "delete",
            StreamMessage::Reconnected => "reconnected",
            StreamMessage::Resync(_) => "resync",
        }
    }
}
