use std::fmt;

// === StoreError ===

/// Errors raised at the persistent store boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    Unreachable(String),
    /// The store refused the write (missing record, foreign owner, constraint).
    Rejected(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unreachable(msg) => write!(f, "Store unreachable: {}", msg),
            StoreError::Rejected(msg) => write!(f, "Store rejected write: {}", msg),
            StoreError::DatabaseError(msg) => write!(f, "Store database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

// === FeedError ===

/// Errors raised at the change-feed boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Opening the subscription failed.
    SubscribeFailed(String),
    /// The transport dropped.
    Disconnected(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::SubscribeFailed(msg) => write!(f, "Feed subscribe failed: {}", msg),
            FeedError::Disconnected(msg) => write!(f, "Feed disconnected: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}

// === SyncError ===

/// Error taxonomy of the synchronization core.
///
/// Store and feed errors are converted into one of these kinds at the boundary;
/// none of them terminates the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No valid session. Halts every core operation.
    Unauthenticated,
    /// Empty title or url after trimming.
    ValidationError(String),
    /// A read or write was rejected by the store.
    StoreError(String),
    /// The change feed dropped or could not be opened.
    FeedDisconnect(String),
    /// A subscription is already active for this view.
    AlreadyAttached(String),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Unauthenticated => write!(f, "Not authenticated"),
            SyncError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SyncError::StoreError(msg) => write!(f, "Store error: {}", msg),
            SyncError::FeedDisconnect(msg) => write!(f, "Feed disconnected: {}", msg),
            SyncError::AlreadyAttached(owner) => {
                write!(f, "Change stream already attached for owner: {}", owner)
            }
        }
    }
}

impl std::error::Error for SyncError {}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::StoreError(err.to_string())
    }
}

impl From<FeedError> for SyncError {
    fn from(err: FeedError) -> Self {
        SyncError::FeedDisconnect(err.to_string())
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
