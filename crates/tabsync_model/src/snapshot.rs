//! Snapshot normalization.

use crate::diff::Diff;
use crate::row::{RawRow, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A normalized, ordered capture of one store's records.
///
/// # Invariants
///
/// - The header and every record have the same column count
/// - Every record has a non-empty key
/// - Record keys are unique (the last occurrence in the source wins)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    header: Row,
    records: Vec<Row>,
}

impl Snapshot {
    /// Creates an empty snapshot (no header cells, no records).
    ///
    /// This is the "previous" side of a cold-start diff.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a raw read. The first raw row is the header.
    ///
    /// - Every row is padded to the widest row observed
    /// - Cells are trimmed; absent cells become empty text
    /// - Blank rows are dropped, except the header
    /// - Rows with an empty key are not addressable and are dropped
    /// - Duplicate keys collapse onto their last occurrence
    pub fn normalize(raw: &[RawRow]) -> Self {
        let Some((header, body)) = raw.split_first() else {
            return Self::empty();
        };

        let width = raw.iter().map(Vec::len).max().unwrap_or(0);
        let header = Row::from_raw(header, width);

        let rows: Vec<Row> = body
            .iter()
            .map(|raw_row| Row::from_raw(raw_row, width))
            .filter(|row| !row.is_blank() && !row.key().is_empty())
            .collect();

        Self {
            header,
            records: dedup_last_wins(rows),
        }
    }

    /// Creates a snapshot from a header and records that are already
    /// normalized. Records are padded to a common width, and blank or
    /// keyless records and duplicate keys are handled as in [`Self::normalize`].
    pub fn from_rows(header: Row, records: Vec<Row>) -> Self {
        let mut raw = Vec::with_capacity(records.len() + 1);
        raw.push(header.to_raw());
        raw.extend(records.iter().map(Row::to_raw));
        Self::normalize(&raw)
    }

    /// Returns the header row.
    pub fn header(&self) -> &Row {
        &self.header
    }

    /// Returns the records in snapshot order.
    pub fn records(&self) -> &[Row] {
        &self.records
    }

    /// Returns the record with the given key.
    pub fn get(&self, key: &str) -> Option<&Row> {
        self.records.iter().find(|row| row.key() == key)
    }

    /// Iterates over record keys in snapshot order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(Row::key)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the snapshot has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the column count shared by the header and all records.
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Drops every record whose key does not satisfy `keep`.
    #[must_use]
    pub fn retain_keys(mut self, mut keep: impl FnMut(&str) -> bool) -> Self {
        self.records.retain(|row| keep(row.key()));
        self
    }

    /// Returns the header followed by the records, in raw form.
    ///
    /// Normalizing the result yields `self` again.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        std::iter::once(&self.header)
            .chain(self.records.iter())
            .map(Row::to_raw)
            .collect()
    }

    /// Applies a diff as a target store would: upserts replace records in
    /// place or append, then deletions remove by key.
    #[must_use]
    pub fn apply(&self, diff: &Diff) -> Self {
        let mut records = self.records.clone();
        for row in &diff.upserts {
            match records.iter_mut().find(|existing| existing.key() == row.key()) {
                Some(existing) => *existing = row.clone(),
                None => records.push(row.clone()),
            }
        }
        records.retain(|row| !diff.deletions.contains(row.key()));
        Self::from_rows(self.header.clone(), records)
    }
}

/// Keeps only the last occurrence of each key, at that occurrence's position.
fn dedup_last_wins(rows: Vec<Row>) -> Vec<Row> {
    let mut last_index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        last_index.insert(row.key().to_owned(), index);
    }
    if last_index.len() == rows.len() {
        return rows;
    }

    rows.into_iter()
        .enumerate()
        .filter(|(index, row)| last_index.get(row.key()) == Some(index))
        .map(|(_, row)| row)
        .collect()
}
