//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a reconciliation pass.
///
/// Any of these aborts the current pass only. The direction loop logs it
/// and retries at its next tick with unchanged state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The source store could not be read.
    #[error("read from {store} failed: {message}")]
    Read {
        /// Store display name.
        store: String,
        /// Error message.
        message: String,
    },

    /// The target store rejected a write.
    #[error("write to {store} failed: {message}")]
    Write {
        /// Store display name.
        store: String,
        /// Error message.
        message: String,
    },

    /// Bulk replacement was requested but the target cannot do it.
    #[error("store {store} does not support bulk replacement")]
    BulkReplaceUnsupported {
        /// Store display name.
        store: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A pass task panicked or was aborted.
    #[error("sync task failed: {0}")]
    TaskFailed(String),
}

impl SyncError {
    /// Creates a read error for the named store.
    pub fn read(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Creates a write error for the named store.
    pub fn write(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Returns true if repeating the pass at the next tick may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Read { .. } | SyncError::Write { .. } | SyncError::TaskFailed(_)
        )
    }
}
