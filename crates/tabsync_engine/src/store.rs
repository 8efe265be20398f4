//! Store adapter abstraction.

use crate::error::{SyncError, SyncResult};
use tabsync_model::{RawRow, Row};

/// Uniform access to one tabular store (a spreadsheet, a relational table).
///
/// This trait abstracts the storage layer, allowing the reconciler to move
/// rows between any two stores. Calls may block on network or database
/// round-trips; the engine runs them off the async executor.
///
/// # Invariants
///
/// - `read_all` returns the header as its first row
/// - `upsert` is idempotent: writing the same row twice leaves one record
/// - `delete` of a missing key succeeds
pub trait StoreAdapter: Send + Sync {
    /// Display name used in logs and errors.
    fn name(&self) -> &str;

    /// Reads every row, header first, without normalization.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Read`] on authentication, network or query failure.
    fn read_all(&self) -> SyncResult<Vec<RawRow>>;

    /// Writes or replaces the record whose key matches `row.key()`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Write`] if the store rejects the write.
    fn upsert(&self, row: &Row) -> SyncResult<()>;

    /// Removes the record with `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Write`] if the store rejects the delete.
    fn delete(&self, key: &str) -> SyncResult<()>;

    /// Returns true if [`StoreAdapter::replace_all`] is available.
    fn supports_bulk_replace(&self) -> bool {
        false
    }

    /// Replaces every record below the header in one call.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`SyncError::BulkReplaceUnsupported`].
    fn replace_all(&self, header: &Row, records: &[Row]) -> SyncResult<()> {
        let _ = (header, records);
        Err(SyncError::BulkReplaceUnsupported {
            store: self.name().to_owned(),
        })
    }
}
