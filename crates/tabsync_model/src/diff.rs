//! Structural diff between two snapshots.

use crate::row::Row;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The upserts and deletions that move a target from matching one
/// snapshot to matching another.
///
/// Upserts and deletions act on disjoint key sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// New or changed records, in current-snapshot order.
    pub upserts: Vec<Row>,
    /// Keys present before but absent now.
    pub deletions: BTreeSet<String>,
}

impl Diff {
    /// Computes the diff from `previous` to `current`.
    ///
    /// A record is upserted when its key is new or its cells differ from the
    /// previous record with that key. Rows are compared cell by cell; the
    /// fingerprint plays no part here.
    ///
    /// If `current` holds two records with the same key, the later one is
    /// authoritative. Against an empty `previous`, every record is an upsert
    /// and nothing is deleted.
    pub fn between(previous: &Snapshot, current: &Snapshot) -> Self {
        let before: HashMap<&str, &Row> = previous
            .records()
            .iter()
            .map(|row| (row.key(), row))
            .collect();

        let mut latest: HashMap<&str, usize> = HashMap::with_capacity(current.len());
        for (index, row) in current.records().iter().enumerate() {
            latest.insert(row.key(), index);
        }

        let upserts = current
            .records()
            .iter()
            .enumerate()
            .filter(|(index, row)| latest.get(row.key()) == Some(index))
            .filter(|(_, row)| before.get(row.key()) != Some(row))
            .map(|(_, row)| row.clone())
            .collect();

        let deletions = before
            .keys()
            .filter(|key| !latest.contains_key(*key))
            .map(|key| (*key).to_owned())
            .collect();

        Self { upserts, deletions }
    }

    /// Returns true if applying this diff would change nothing.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletions.is_empty()
    }

    /// Returns the total number of row operations.
    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rows: &[&[&str]]) -> Snapshot {
        let header: Row = ["id", "value"].into_iter().collect();
        let records = rows
            .iter()
            .map(|cells| cells.iter().copied().collect())
            .collect();
        Snapshot::from_rows(header, records)
    }

    #[test]
    fn replaced_record_scenario() {
        let previous = snapshot(&[&["1", "A"], &["2", "B"]]);
        let current = snapshot(&[&["1", "A"], &["3", "C"]]);

        let diff = Diff::between(&previous, &current);
        assert_eq!(diff.upserts, vec![["3", "C"].into_iter().collect::<Row>()]);
        assert_eq!(diff.deletions, BTreeSet::from(["2".to_string()]));
    }

    #[test]
    fn self_diff_is_empty() {
        let s = snapshot(&[&["1", "A"], &["2", "B"]]);
        let diff = Diff::between(&s, &s);
        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn cold_start_upserts_everything() {
        let current = snapshot(&[&["1", "A"], &["2", "B"]]);
        let diff = Diff::between(&Snapshot::empty(), &current);
        assert_eq!(diff.upserts, current.records());
        assert!(diff.deletions.is_empty());
    }

    #[test]
    fn changed_cell_is_upserted() {
        let previous = snapshot(&[&["1", "A"], &["2", "B"]]);
        let current = snapshot(&[&["1", "A"], &["2", "B2"]]);
        let diff = Diff::between(&previous, &current);
        assert_eq!(diff.upserts.len(), 1);
        assert_eq!(diff.upserts[0].get(1), Some("B2"));
        assert!(diff.deletions.is_empty());
    }

    #[test]
    fn reordering_alone_is_not_a_change() {
        let previous = snapshot(&[&["1", "A"], &["2", "B"]]);
        let current = snapshot(&[&["2", "B"], &["1", "A"]]);
        assert!(Diff::between(&previous, &current).is_empty());
    }

    #[test]
    fn widened_rows_are_upserted() {
        let previous = snapshot(&[&["1", "A"]]);
        let header: Row = ["id", "value", "extra"].into_iter().collect();
        let current = Snapshot::from_rows(header, vec![["1", "A"].into_iter().collect()]);
        let diff = Diff::between(&previous, &current);
        assert_eq!(diff.upserts.len(), 1);
        assert_eq!(diff.upserts[0].len(), 3);
    }

    #[test]
    fn later_duplicate_in_current_is_authoritative() {
        // Deserialization bypasses normalization, so duplicates can appear.
        let current: Snapshot = serde_json::from_str(
            r#"{"header":["id","value"],"records":[["1","A"],["2","B"],["1","Z"]]}"#,
        )
        .unwrap();

        let diff = Diff::between(&snapshot(&[&["1", "A"], &["2", "B"]]), &current);
        assert_eq!(diff.upserts, vec![["1", "Z"].into_iter().collect::<Row>()]);
        assert!(diff.deletions.is_empty());

        let diff = Diff::between(&snapshot(&[&["1", "Z"], &["2", "B"]]), &current);
        assert!(diff.is_empty());
    }
}
