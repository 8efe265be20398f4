//! # tabsync model
//!
//! Pure data model for bidirectional table reconciliation.
//!
//! This crate provides:
//! - [`Row`] and [`RawRow`]: canonical and unnormalized record shapes
//! - [`Snapshot`]: a normalized capture of one store (snapshot normalizer)
//! - [`Fingerprint`]: a content digest used as a cheap change gate
//! - [`Diff`]: upserts and deletions between two snapshots
//!
//! Nothing here performs I/O. Every function is deterministic given
//! identical input ordering.
//!
//! ## Example
//!
//! ```rust
//! use tabsync_model::{Diff, Fingerprint, Snapshot};
//!
//! let previous = Snapshot::normalize(&[
//!     vec![Some("id".into()), Some("name".into())],
//!     vec![Some("1".into()), Some("A".into())],
//!     vec![Some("2".into()), Some("B".into())],
//! ]);
//! let current = Snapshot::normalize(&[
//!     vec![Some("id".into()), Some("name".into())],
//!     vec![Some("1".into()), Some("A".into())],
//!     vec![Some("3".into()), Some("C".into())],
//! ]);
//!
//! assert_ne!(Fingerprint::of(&previous), Fingerprint::of(&current));
//!
//! let diff = Diff::between(&previous, &current);
//! assert_eq!(diff.upserts.len(), 1);
//! assert_eq!(diff.upserts[0].key(), "3");
//! assert!(diff.deletions.contains("2"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod fingerprint;
mod row;
mod snapshot;

pub use diff::Diff;
pub use fingerprint::Fingerprint;
pub use row::{Cell, RawRow, Row};
pub use snapshot::Snapshot;
