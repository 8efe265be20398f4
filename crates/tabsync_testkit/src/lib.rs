//! # tabsync testkit
//!
//! Shared test tooling for tabsync:
//!
//! - **Generators**: proptest strategies for raw reads and snapshots
//! - **Fixtures**: a small internships table in raw and normalized form
//!
//! The property tests in [`generators`] also pin down the laws the model
//! must obey (idempotent normalization, fingerprint sensitivity, diff
//! convergence).

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::{internship_header, internship_raw, internship_rows, internship_snapshot, row};
pub use generators::{
    keyed_snapshot_strategy, raw_cell_strategy, raw_row_strategy, raw_table_strategy,
    snapshot_strategy,
};
