//! Periodic driver for both reconciliation directions.

use crate::config::{Direction, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::gate::SyncGate;
use crate::reconciler::{PassOutcome, Reconciler, SyncState};
use crate::store::StoreAdapter;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// Result of one tick of a direction loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The gate was held by the other direction; no pass ran.
    Skipped,
    /// A pass ran to completion.
    Completed(PassOutcome),
    /// A pass ran and failed; state is unchanged.
    Failed(SyncError),
}

/// Statistics about one direction loop.
#[derive(Debug, Clone, Default)]
pub struct DirectionStats {
    /// Passes that wrote changes.
    pub passes_applied: u64,
    /// Passes that found nothing new.
    pub passes_unchanged: u64,
    /// Passes that failed.
    pub passes_failed: u64,
    /// Ticks skipped because the gate was busy.
    pub ticks_skipped: u64,
    /// Total rows upserted (or rewritten by bulk replace).
    pub rows_upserted: u64,
    /// Total keys deleted.
    pub rows_deleted: u64,
    /// Last error message.
    pub last_error: Option<String>,
    /// Time of the last successful pass.
    pub last_success: Option<Instant>,
}

impl DirectionStats {
    fn record(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Skipped => self.ticks_skipped += 1,
            TickOutcome::Completed(PassOutcome::Unchanged) => {
                self.passes_unchanged += 1;
                self.last_success = Some(Instant::now());
                self.last_error = None;
            }
            TickOutcome::Completed(PassOutcome::Applied(report)) => {
                self.passes_applied += 1;
                self.rows_upserted += report.upserted as u64;
                self.rows_deleted += report.deleted as u64;
                self.last_success = Some(Instant::now());
                self.last_error = None;
            }
            TickOutcome::Failed(err) => {
                self.passes_failed += 1;
                self.last_error = Some(err.to_string());
            }
        }
    }
}

/// Drives one direction: tick, pass under the gate, sleep, repeat.
///
/// Passes within a loop are strictly sequential. A failed pass is logged
/// and retried at the next tick.
pub struct DirectionLoop {
    direction: Direction,
    interval: Duration,
    source: Arc<dyn StoreAdapter>,
    target: Arc<dyn StoreAdapter>,
    reconciler: Arc<Mutex<Reconciler>>,
    published: Arc<RwLock<SyncState>>,
    gate: SyncGate,
    stats: Arc<RwLock<DirectionStats>>,
}

impl DirectionLoop {
    /// Creates a loop for `direction` moving rows from `source` to `target`.
    pub fn new(
        direction: Direction,
        config: &SyncConfig,
        source: Arc<dyn StoreAdapter>,
        target: Arc<dyn StoreAdapter>,
        gate: SyncGate,
    ) -> Self {
        let settings = config.direction(direction).clone();
        Self {
            direction,
            interval: settings.poll_interval,
            source,
            target,
            reconciler: Arc::new(Mutex::new(Reconciler::new(direction, settings))),
            published: Arc::new(RwLock::new(SyncState::new())),
            gate,
            stats: Arc::new(RwLock::new(DirectionStats::default())),
        }
    }

    /// Returns the direction this loop drives.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns a copy of the loop statistics.
    pub fn stats(&self) -> DirectionStats {
        self.stats.read().clone()
    }

    /// Returns the reconciler state as of the last successful pass.
    ///
    /// Never waits on an in-flight pass.
    pub fn state(&self) -> SyncState {
        self.published.read().clone()
    }

    /// Runs one tick: try the gate, and if acquired run exactly one pass.
    ///
    /// Store calls run on the blocking pool. The gate is released when the
    /// pass returns, whether it succeeded, failed or panicked.
    pub async fn tick(&self) -> TickOutcome {
        let Some(guard) = self.gate.try_acquire(self.direction) else {
            debug!(direction = %self.direction, "gate busy, skipping tick");
            let outcome = TickOutcome::Skipped;
            self.stats.write().record(&outcome);
            return outcome;
        };

        let reconciler = Arc::clone(&self.reconciler);
        let source = Arc::clone(&self.source);
        let target = Arc::clone(&self.target);
        let published = Arc::clone(&self.published);
        let pass = tokio::task::spawn_blocking(move || -> SyncResult<PassOutcome> {
            let _guard = guard;
            let mut reconciler = reconciler.lock();
            let outcome = reconciler.run_once(source.as_ref(), target.as_ref())?;
            if matches!(outcome, PassOutcome::Applied(_)) {
                *published.write() = reconciler.state().clone();
            }
            Ok(outcome)
        });

        let outcome = match pass.await {
            Ok(Ok(outcome)) => TickOutcome::Completed(outcome),
            Ok(Err(err)) => TickOutcome::Failed(err),
            Err(join_err) => TickOutcome::Failed(SyncError::TaskFailed(join_err.to_string())),
        };

        if let TickOutcome::Failed(err) = &outcome {
            warn!(
                direction = %self.direction,
                error = %err,
                retryable = err.is_retryable(),
                "pass failed"
            );
        }
        self.stats.write().record(&outcome);
        outcome
    }

    /// Ticks until `shutdown` is cancelled.
    ///
    /// The signal is observed between cycles only; an in-flight pass always
    /// runs to completion.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(direction = %self.direction, interval = ?self.interval, "direction loop started");
        while !shutdown.is_cancelled() {
            self.tick().await;
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        info!(direction = %self.direction, "direction loop stopped");
    }
}

/// Runs both directions as independent periodic tasks sharing one gate.
///
/// The coordinator owns timing, exclusion and shutdown; it knows nothing of
/// the rows being moved.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tabsync_engine::{MemoryStore, SyncConfig, SyncCoordinator};
///
/// # async fn demo() -> tabsync_engine::SyncResult<()> {
/// let sheet = Arc::new(MemoryStore::new("sheet").with_header(&["id", "name"]));
/// let table = Arc::new(MemoryStore::new("table").with_header(&["id", "name"]));
///
/// let handle = SyncCoordinator::new(SyncConfig::default(), sheet, table)?.start();
/// // ... later
/// handle.shutdown();
/// handle.join().await?;
/// # Ok(())
/// # }
/// ```
pub struct SyncCoordinator {
    config: SyncConfig,
    store_a: Arc<dyn StoreAdapter>,
    store_b: Arc<dyn StoreAdapter>,
    gate: SyncGate,
    shutdown: CancellationToken,
}

impl SyncCoordinator {
    /// Creates a coordinator for stores A and B.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the configuration is invalid.
    pub fn new(
        config: SyncConfig,
        store_a: Arc<dyn StoreAdapter>,
        store_b: Arc<dyn StoreAdapter>,
    ) -> SyncResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store_a,
            store_b,
            gate: SyncGate::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Uses an externally owned shutdown token.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns a handle to the shared gate.
    pub fn gate(&self) -> SyncGate {
        self.gate.clone()
    }

    /// Returns the shutdown token.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Builds the loop for one direction, wired to the shared gate.
    pub fn direction_loop(&self, direction: Direction) -> DirectionLoop {
        let (source, target) = match direction {
            Direction::AToB => (&self.store_a, &self.store_b),
            Direction::BToA => (&self.store_b, &self.store_a),
        };
        DirectionLoop::new(
            direction,
            &self.config,
            Arc::clone(source),
            Arc::clone(target),
            self.gate.clone(),
        )
    }

    /// Spawns both direction loops on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(self) -> CoordinatorHandle {
        let mut stats = Vec::with_capacity(2);
        let mut tasks = Vec::with_capacity(2);

        for direction in [Direction::AToB, Direction::BToA] {
            let direction_loop = self.direction_loop(direction);
            stats.push((direction, Arc::clone(&direction_loop.stats)));

            let span = info_span!("sync", direction = %direction);
            let shutdown = self.shutdown.clone();
            tasks.push(tokio::spawn(direction_loop.run(shutdown).instrument(span)));
        }

        info!(
            a = self.store_a.name(),
            b = self.store_b.name(),
            "sync coordinator started"
        );

        CoordinatorHandle {
            shutdown: self.shutdown,
            gate: self.gate,
            stats,
            tasks,
        }
    }
}

/// Handle to a running coordinator.
pub struct CoordinatorHandle {
    shutdown: CancellationToken,
    gate: SyncGate,
    stats: Vec<(Direction, Arc<RwLock<DirectionStats>>)>,
    tasks: Vec<JoinHandle<()>>,
}

impl CoordinatorHandle {
    /// Signals both loops to stop after their current cycle.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Returns true once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Returns a copy of one direction's statistics.
    pub fn stats(&self, direction: Direction) -> DirectionStats {
        self.stats
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|(_, stats)| stats.read().clone())
            .unwrap_or_default()
    }

    /// Returns a handle to the shared gate.
    pub fn gate(&self) -> SyncGate {
        self.gate.clone()
    }

    /// Waits for both loops to stop.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskFailed`] if a loop task panicked.
    pub async fn join(self) -> SyncResult<()> {
        let mut failure = None;
        for task in self.tasks {
            if let Err(err) = task.await {
                failure.get_or_insert(SyncError::TaskFailed(err.to_string()));
            }
        }
        info!("sync coordinator stopped");
        failure.map_or(Ok(()), Err)
    }
}
