//! Property-based test generators using proptest.
//!
//! Provides strategies for raw store reads (untidy, possibly duplicated)
//! and for normalized snapshots with unique keys.

use proptest::prelude::*;
use tabsync_model::{RawRow, Row, Snapshot};

/// Strategy for a raw cell: absent, blank, or short text with padding.
pub fn raw_cell_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::string::string_regex("[ ]{0,2}[a-c0-9]{0,3}[ ]{0,2}").expect("Invalid regex"))
}

/// Strategy for a raw row of up to `max_width` cells.
pub fn raw_row_strategy(max_width: usize) -> impl Strategy<Value = RawRow> {
    prop::collection::vec(raw_cell_strategy(), 0..=max_width)
}

/// Strategy for a whole raw read: header first, ragged rows, blanks and
/// duplicate keys all allowed.
pub fn raw_table_strategy() -> impl Strategy<Value = Vec<RawRow>> {
    prop::collection::vec(raw_row_strategy(5), 0..12)
}

/// Strategy for snapshots produced by normalizing arbitrary raw reads.
pub fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    raw_table_strategy().prop_map(|raw| Snapshot::normalize(&raw))
}

/// Strategy for snapshots with numeric unique keys and three columns,
/// records in arbitrary order.
pub fn keyed_snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(
        prop::string::string_regex("[1-9][0-9]{0,2}").expect("Invalid regex"),
        prop::collection::vec(
            prop::string::string_regex("[a-z]{0,3}").expect("Invalid regex"),
            2,
        ),
        0..10,
    )
    .prop_map(|records| {
        records
            .into_iter()
            .map(|(key, rest)| std::iter::once(key).chain(rest).collect::<Row>())
            .collect::<Vec<_>>()
    })
    .prop_shuffle()
    .prop_map(|records| {
        let header: Row = ["id", "name", "note"].into_iter().collect();
        Snapshot::from_rows(header, records)
    })
}
