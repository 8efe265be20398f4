//! # tabsync engine
//!
//! Bidirectional reconciliation between two independently mutable tabular
//! stores (for example a spreadsheet and a relational table), with no shared
//! transaction log and no change notifications from either side.
//!
//! This crate provides:
//! - The [`StoreAdapter`] capability trait and an in-memory [`MemoryStore`]
//! - The [`Reconciler`]: one read → detect → apply pass per direction
//! - The [`SyncGate`]: non-blocking mutual exclusion between directions
//! - The [`SyncCoordinator`]: two periodic loops plus cooperative shutdown
//!
//! ## Architecture
//!
//! ```text
//! StoreAdapter ─▶ Snapshot::normalize ─▶ Fingerprint / Diff ─▶ Reconciler ─▶ StoreAdapter
//! ```
//!
//! Each direction polls its source on a fixed interval. A tick first tries
//! the shared gate; if the other direction holds it, the tick is skipped.
//! Otherwise one pass runs: the source is read and normalized, its
//! fingerprint is compared against the last applied one, and only on a
//! mismatch is a diff computed and written to the target.
//!
//! ## Key Invariants
//!
//! - At most one pass runs at a time across the process
//! - A failed pass leaves its direction's state unchanged
//! - Upserts and deletes are keyed, so replaying a pass is harmless
//! - State lives in memory only; a restart re-upserts everything once
//!
//! Concurrent edits to the same record on both sides within one poll cycle
//! resolve as last writer wins.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod coordinator;
mod error;
mod gate;
mod memory;
mod reconciler;
mod store;

pub use config::{ApplyMode, Direction, DirectionConfig, KeyPolicy, SyncConfig, DEFAULT_POLL_INTERVAL};
pub use coordinator::{CoordinatorHandle, DirectionLoop, DirectionStats, SyncCoordinator, TickOutcome};
pub use error::{SyncError, SyncResult};
pub use gate::{GateGuard, GateStats, SyncGate};
pub use memory::{MemoryStore, WriteCounts};
pub use reconciler::{PassOutcome, PassReport, Reconciler, SyncState};
pub use store::StoreAdapter;

pub use tabsync_model::{Cell, Diff, Fingerprint, RawRow, Row, Snapshot};
pub use tokio_util::sync::CancellationToken;
