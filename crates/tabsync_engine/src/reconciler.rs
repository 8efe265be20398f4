//! One-direction reconciliation pass.

use crate::config::{ApplyMode, Direction, DirectionConfig};
use crate::error::{SyncError, SyncResult};
use crate::store::StoreAdapter;
use tabsync_model::{Diff, Fingerprint, Snapshot};
use tracing::{debug, info};

/// What a direction remembers between passes.
///
/// Held in memory only. A fresh state makes the next pass upsert every
/// source record and delete nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    last_fingerprint: Option<Fingerprint>,
    last_snapshot: Snapshot,
}

impl SyncState {
    /// Creates a cold-start state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint of the last applied source snapshot.
    pub fn last_fingerprint(&self) -> Option<Fingerprint> {
        self.last_fingerprint
    }

    /// Last applied source snapshot.
    pub fn last_snapshot(&self) -> &Snapshot {
        &self.last_snapshot
    }

    /// Returns true if no pass has been applied yet.
    pub fn is_cold(&self) -> bool {
        self.last_fingerprint.is_none()
    }
}

/// Summary of a pass that wrote to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Rows written to the target.
    pub upserted: usize,
    /// Keys removed from the target (or dropped by a bulk replace).
    pub deleted: usize,
    /// Fingerprint of the source snapshot now recorded in state.
    pub fingerprint: Fingerprint,
    /// How the changes were written.
    pub mode: ApplyMode,
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The source fingerprint matched; nothing was diffed or written.
    Unchanged,
    /// The source changed and the target was brought up to date.
    Applied(PassReport),
}

/// Runs synchronization passes from a source store to a target store.
///
/// Each reconciler exclusively owns the [`SyncState`] for its direction.
/// A failed pass leaves that state untouched, so the next pass retries the
/// same changes; upserts and deletes are keyed and safe to replay.
#[derive(Debug)]
pub struct Reconciler {
    direction: Direction,
    config: DirectionConfig,
    state: SyncState,
}

impl Reconciler {
    /// Creates a reconciler with a cold-start state.
    pub fn new(direction: Direction, config: DirectionConfig) -> Self {
        Self::with_state(direction, config, SyncState::new())
    }

    /// Creates a reconciler resuming from `state`.
    pub fn with_state(direction: Direction, config: DirectionConfig, state: SyncState) -> Self {
        Self {
            direction,
            config,
            state,
        }
    }

    /// Returns the direction this reconciler runs.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the current state.
    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Reads and normalizes the source, keeping only addressable keys.
    fn read_source(&self, source: &dyn StoreAdapter) -> SyncResult<Snapshot> {
        let raw = source.read_all()?;
        let policy = self.config.key_policy;
        Ok(Snapshot::normalize(&raw).retain_keys(|key| policy.admits(key)))
    }

    /// Executes one pass: read, detect, apply.
    ///
    /// # Errors
    ///
    /// Returns the first read or write error. State is only replaced after
    /// every write has succeeded.
    pub fn run_once(
        &mut self,
        source: &dyn StoreAdapter,
        target: &dyn StoreAdapter,
    ) -> SyncResult<PassOutcome> {
        let current = self.read_source(source)?;
        let fingerprint = Fingerprint::of(&current);

        if self.state.last_fingerprint == Some(fingerprint) {
            debug!(
                direction = %self.direction,
                source = source.name(),
                "no change detected"
            );
            return Ok(PassOutcome::Unchanged);
        }

        let diff = Diff::between(&self.state.last_snapshot, &current);
        let report = match self.config.apply_mode {
            ApplyMode::Incremental => apply_incremental(&diff, target, fingerprint)?,
            ApplyMode::BulkReplace => apply_bulk(&current, &diff, target, fingerprint)?,
        };

        info!(
            direction = %self.direction,
            source = source.name(),
            target = target.name(),
            upserts = report.upserted,
            deletions = report.deleted,
            mode = ?report.mode,
            "applied changes"
        );

        self.state = SyncState {
            last_fingerprint: Some(fingerprint),
            last_snapshot: current,
        };
        Ok(PassOutcome::Applied(report))
    }
}

fn apply_incremental(
    diff: &Diff,
    target: &dyn StoreAdapter,
    fingerprint: Fingerprint,
) -> SyncResult<PassReport> {
    for row in &diff.upserts {
        target.upsert(row)?;
    }
    for key in &diff.deletions {
        target.delete(key)?;
    }
    Ok(PassReport {
        upserted: diff.upserts.len(),
        deleted: diff.deletions.len(),
        fingerprint,
        mode: ApplyMode::Incremental,
    })
}

fn apply_bulk(
    current: &Snapshot,
    diff: &Diff,
    target: &dyn StoreAdapter,
    fingerprint: Fingerprint,
) -> SyncResult<PassReport> {
    if !target.supports_bulk_replace() {
        return Err(SyncError::BulkReplaceUnsupported {
            store: target.name().to_owned(),
        });
    }
    target.replace_all(current.header(), current.records())?;
    Ok(PassReport {
        upserted: current.len(),
        deleted: diff.deletions.len(),
        fingerprint,
        mode: ApplyMode::BulkReplace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyPolicy;
    use crate::memory::MemoryStore;

    fn stores() -> (MemoryStore, MemoryStore) {
        let source = MemoryStore::new("sheet").with_header(&["id", "name"]);
        let target = MemoryStore::new("table").with_header(&["id", "name"]);
        (source, target)
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(Direction::AToB, DirectionConfig::default())
    }

    #[test]
    fn cold_start_copies_everything() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);
        source.put_row(&["2", "B"]);

        let mut reconciler = reconciler();
        assert!(reconciler.state().is_cold());

        let outcome = reconciler.run_once(&source, &target).unwrap();
        let PassOutcome::Applied(report) = outcome else {
            panic!("expected applied pass");
        };
        assert_eq!(report.upserted, 2);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.fingerprint, Fingerprint::of(&source.snapshot()));
        assert_eq!(target.snapshot().records(), source.snapshot().records());
        assert!(!reconciler.state().is_cold());
    }

    #[test]
    fn unchanged_source_short_circuits() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);

        let mut reconciler = reconciler();
        reconciler.run_once(&source, &target).unwrap();
        let before = reconciler.state().clone();
        let writes = target.write_counts();

        let outcome = reconciler.run_once(&source, &target).unwrap();
        assert_eq!(outcome, PassOutcome::Unchanged);
        assert_eq!(reconciler.state(), &before);
        assert_eq!(target.write_counts(), writes);
    }

    #[test]
    fn delete_and_insert_scenario() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);
        source.put_row(&["2", "B"]);

        let mut reconciler = reconciler();
        reconciler.run_once(&source, &target).unwrap();

        source.remove_row("2");
        source.put_row(&["3", "C"]);
        let outcome = reconciler.run_once(&source, &target).unwrap();

        let PassOutcome::Applied(report) = outcome else {
            panic!("expected applied pass");
        };
        assert_eq!((report.upserted, report.deleted), (1, 1));
        let keys: Vec<_> = target.snapshot().keys().map(str::to_owned).collect();
        assert_eq!(keys, vec!["1", "3"]);
        assert_eq!(target.write_counts().upserts, 3);
    }

    #[test]
    fn failed_read_leaves_state_unchanged() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);

        let mut reconciler = reconciler();
        reconciler.run_once(&source, &target).unwrap();
        let before = reconciler.state().clone();

        source.put_row(&["2", "B"]);
        source.set_fail_reads(true);
        let err = reconciler.run_once(&source, &target).unwrap_err();
        assert!(matches!(err, SyncError::Read { .. }));
        assert_eq!(reconciler.state(), &before);
    }

    #[test]
    fn failed_write_is_retried_next_pass() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);

        let mut reconciler = reconciler();
        target.set_fail_writes(true);
        assert!(reconciler.run_once(&source, &target).is_err());
        assert!(reconciler.state().is_cold());
        assert!(target.snapshot().is_empty());

        target.set_fail_writes(false);
        let outcome = reconciler.run_once(&source, &target).unwrap();
        assert!(matches!(outcome, PassOutcome::Applied(_)));
        assert_eq!(target.snapshot().records(), source.snapshot().records());
    }

    #[test]
    fn bulk_replace_rewrites_target() {
        let source = MemoryStore::new("table").with_header(&["id", "name"]);
        let target = MemoryStore::new("sheet")
            .with_header(&["ID", "Name"])
            .with_bulk_replace();
        target.put_row(&["99", "stray"]);
        source.put_row(&["1", "A"]);

        let config = DirectionConfig::default().with_apply_mode(ApplyMode::BulkReplace);
        let mut reconciler = Reconciler::new(Direction::BToA, config);
        let outcome = reconciler.run_once(&source, &target).unwrap();

        let PassOutcome::Applied(report) = outcome else {
            panic!("expected applied pass");
        };
        assert_eq!(report.mode, ApplyMode::BulkReplace);
        assert_eq!(target.write_counts().bulk_replaces, 1);
        assert_eq!(target.snapshot().keys().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(target.snapshot().header().cells(), &["ID", "Name"]);
    }

    #[test]
    fn bulk_replace_unsupported_keeps_state() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);

        let config = DirectionConfig::default().with_apply_mode(ApplyMode::BulkReplace);
        let mut reconciler = Reconciler::new(Direction::AToB, config);
        let err = reconciler.run_once(&source, &target).unwrap_err();
        assert!(matches!(err, SyncError::BulkReplaceUnsupported { .. }));
        assert!(reconciler.state().is_cold());
    }

    #[test]
    fn numeric_key_policy_skips_other_rows() {
        let (source, target) = stores();
        source.put_row(&["1", "A"]);
        source.put_row(&["note", "not a record"]);

        let config = DirectionConfig::default().with_key_policy(KeyPolicy::Numeric);
        let mut reconciler = Reconciler::new(Direction::AToB, config);
        reconciler.run_once(&source, &target).unwrap();

        assert_eq!(target.snapshot().keys().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(reconciler.state().last_snapshot().len(), 1);
    }
}
