//! Content fingerprints.

use crate::row::Row;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest over a snapshot's records, in order.
///
/// The header is excluded. Cells are length-delimited before hashing, so
/// moving text across a cell boundary changes the fingerprint.
///
/// Equal fingerprints are treated as "nothing changed". They are never used
/// to decide *which* rows changed; that is [`crate::Diff`]'s job.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprints the records of a snapshot.
    pub fn of(snapshot: &Snapshot) -> Self {
        Self::of_records(snapshot.records())
    }

    /// Fingerprints a sequence of rows.
    pub fn of_records(records: &[Row]) -> Self {
        let mut hasher = Sha256::new();
        for row in records {
            hasher.update((row.len() as u64).to_le_bytes());
            for cell in row.cells() {
                hasher.update((cell.len() as u64).to_le_bytes());
                hasher.update(cell.as_bytes());
            }
        }
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().copied().collect()
    }

    #[test]
    fn same_content_same_fingerprint() {
        let a = vec![row(&["1", "A"]), row(&["2", "B"])];
        let b = vec![row(&["1", "A"]), row(&["2", "B"])];
        assert_eq!(Fingerprint::of_records(&a), Fingerprint::of_records(&b));
    }

    #[test]
    fn order_sensitive() {
        let a = vec![row(&["1", "A"]), row(&["2", "B"])];
        let b = vec![row(&["2", "B"]), row(&["1", "A"])];
        assert_ne!(Fingerprint::of_records(&a), Fingerprint::of_records(&b));
    }

    #[test]
    fn cell_boundaries_matter() {
        let a = vec![row(&["1", "ab", "c"])];
        let b = vec![row(&["1", "a", "bc"])];
        assert_ne!(Fingerprint::of_records(&a), Fingerprint::of_records(&b));
    }

    #[test]
    fn header_is_excluded() {
        let a = Snapshot::from_rows(row(&["id", "name"]), vec![row(&["1", "A"])]);
        let b = Snapshot::from_rows(row(&["key", "label"]), vec![row(&["1", "A"])]);
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn empty_fingerprint_is_sha256_of_nothing() {
        assert_eq!(
            Fingerprint::of(&Snapshot::empty()).to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
