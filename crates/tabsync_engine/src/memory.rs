//! In-memory store adapter.

use crate::error::{SyncError, SyncResult};
use crate::store::StoreAdapter;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tabsync_model::{RawRow, Row, Snapshot};

/// Counts of writes a [`MemoryStore`] has accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    /// Accepted upserts.
    pub upserts: u64,
    /// Accepted deletes.
    pub deletes: u64,
    /// Accepted bulk replacements.
    pub bulk_replaces: u64,
}

/// A store adapter backed by an in-memory table.
///
/// Rows are kept raw (header first), so callers can seed untrimmed cells,
/// blank rows or duplicate keys the way a real spreadsheet would hold them.
/// Reads and writes can be made to fail on demand.
///
/// # Example
///
/// ```rust
/// use tabsync_engine::{MemoryStore, StoreAdapter};
///
/// let store = MemoryStore::new("sheet").with_header(&["id", "name"]);
/// store.put_row(&["1", "Ada"]);
/// assert_eq!(store.read_all().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    rows: RwLock<Vec<RawRow>>,
    bulk_replace: bool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicU64,
    upserts: AtomicU64,
    deletes: AtomicU64,
    bulk_replaces: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store with no header row.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(Vec::new()),
            bulk_replace: false,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicU64::new(0),
            upserts: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            bulk_replaces: AtomicU64::new(0),
        }
    }

    /// Sets the header row, replacing any existing one.
    #[must_use]
    pub fn with_header(self, header: &[&str]) -> Self {
        {
            let mut rows = self.rows.write();
            let header = header.iter().map(|cell| Some(cell.to_string())).collect();
            if rows.is_empty() {
                rows.push(header);
            } else {
                rows[0] = header;
            }
        }
        self
    }

    /// Enables [`StoreAdapter::replace_all`].
    #[must_use]
    pub fn with_bulk_replace(mut self) -> Self {
        self.bulk_replace = true;
        self
    }

    /// Makes subsequent reads fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Appends a raw row without counting it as a write.
    pub fn push_raw(&self, row: RawRow) {
        self.rows.write().push(row);
    }

    /// Inserts or replaces a record without counting it as a write.
    ///
    /// Stands in for an edit made by a user or another writer.
    pub fn put_row(&self, cells: &[&str]) {
        let row: Row = cells.iter().copied().collect();
        self.write_row(&row);
    }

    /// Removes a record without counting it as a write.
    pub fn remove_row(&self, key: &str) {
        self.remove_key(key);
    }

    /// Returns a copy of all raw rows, header first.
    pub fn rows(&self) -> Vec<RawRow> {
        self.rows.read().clone()
    }

    /// Returns the normalized contents of the store.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::normalize(&self.rows.read())
    }

    /// Returns the number of `read_all` calls made so far, failed ones included.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns the accepted write counts.
    pub fn write_counts(&self) -> WriteCounts {
        WriteCounts {
            upserts: self.upserts.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
            bulk_replaces: self.bulk_replaces.load(Ordering::SeqCst),
        }
    }

    fn check_writable(&self) -> SyncResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::write(&self.name, "injected write failure"));
        }
        Ok(())
    }

    fn write_row(&self, row: &Row) {
        let mut rows = self.rows.write();
        if rows.is_empty() {
            rows.push(Vec::new());
        }
        let raw = row.to_raw();
        match rows.iter_mut().skip(1).find(|existing| raw_key(existing) == row.key()) {
            Some(existing) => *existing = raw,
            None => rows.push(raw),
        }
    }

    fn remove_key(&self, key: &str) {
        let mut rows = self.rows.write();
        let mut index = 0;
        rows.retain(|row| {
            index += 1;
            index == 1 || raw_key(row) != key
        });
    }
}

/// Key of a raw row, compared the way the normalizer would see it.
fn raw_key(row: &RawRow) -> &str {
    row.first()
        .and_then(|cell| cell.as_deref())
        .map(str::trim)
        .unwrap_or("")
}

impl StoreAdapter for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_all(&self) -> SyncResult<Vec<RawRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::read(&self.name, "injected read failure"));
        }
        Ok(self.rows())
    }

    fn upsert(&self, row: &Row) -> SyncResult<()> {
        self.check_writable()?;
        self.write_row(row);
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, key: &str) -> SyncResult<()> {
        self.check_writable()?;
        self.remove_key(key);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn supports_bulk_replace(&self) -> bool {
        self.bulk_replace
    }

    fn replace_all(&self, header: &Row, records: &[Row]) -> SyncResult<()> {
        if !self.bulk_replace {
            return Err(SyncError::BulkReplaceUnsupported {
                store: self.name.clone(),
            });
        }
        self.check_writable()?;

        let mut rows = self.rows.write();
        let header = match rows.first() {
            Some(existing) => existing.clone(),
            None => header.to_raw(),
        };
        rows.clear();
        rows.push(header);
        rows.extend(records.iter().map(Row::to_raw));
        self.bulk_replaces.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let store = MemoryStore::new("t").with_header(&["id", "v"]);
        store.upsert(&row(&["1", "A"])).unwrap();
        store.upsert(&row(&["1", "B"])).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("1").unwrap().get(1), Some("B"));
        assert_eq!(store.write_counts().upserts, 2);
    }

    #[test]
    fn upsert_matches_untrimmed_keys() {
        let store = MemoryStore::new("t").with_header(&["id", "v"]);
        store.push_raw(vec![Some(" 7 ".into()), Some("old".into())]);
        store.upsert(&row(&["7", "new"])).unwrap();
        assert_eq!(store.rows().len(), 2);
        assert_eq!(store.snapshot().get("7").unwrap().get(1), Some("new"));
    }

    #[test]
    fn delete_missing_key_is_ok() {
        let store = MemoryStore::new("t").with_header(&["id"]);
        store.delete("404").unwrap();
        assert_eq!(store.write_counts().deletes, 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[test]
    fn delete_never_removes_header() {
        let store = MemoryStore::new("t").with_header(&["id"]);
        store.put_row(&["id"]);
        store.delete("id").unwrap();
        assert_eq!(store.rows(), vec![vec![Some("id".to_string())]]);
    }

    #[test]
    fn injected_failures() {
        let store = MemoryStore::new("sheet").with_header(&["id"]);
        store.set_fail_reads(true);
        assert!(matches!(store.read_all(), Err(SyncError::Read { .. })));
        assert_eq!(store.read_count(), 1);

        store.set_fail_writes(true);
        assert!(matches!(store.upsert(&row(&["1"])), Err(SyncError::Write { .. })));
        assert!(matches!(store.delete("1"), Err(SyncError::Write { .. })));
        assert_eq!(store.write_counts(), WriteCounts::default());
    }

    #[test]
    fn replace_all_keeps_existing_header() {
        let store = MemoryStore::new("sheet")
            .with_header(&["ID", "Company"])
            .with_bulk_replace();
        store.put_row(&["9", "stale"]);

        store
            .replace_all(&row(&["id", "company"]), &[row(&["1", "A"]), row(&["2", "B"])])
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.header().cells(), &["ID", "Company"]);
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(store.write_counts().bulk_replaces, 1);
    }

    #[test]
    fn replace_all_requires_opt_in() {
        let store = MemoryStore::new("table").with_header(&["id"]);
        assert!(!store.supports_bulk_replace());
        assert!(matches!(
            store.replace_all(&row(&["id"]), &[]),
            Err(SyncError::BulkReplaceUnsupported { .. })
        ));
    }
}
