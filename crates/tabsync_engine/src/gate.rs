//! Process-wide exclusion gate shared by both directions.

use crate::config::Direction;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Counters describing gate usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Total acquisition attempts.
    pub attempts: u64,
    /// Attempts that acquired the gate.
    pub acquired: u64,
    /// Attempts that found the gate held.
    pub contended: u64,
}

#[derive(Debug, Default)]
struct GateMetrics {
    attempts: AtomicU64,
    acquired: AtomicU64,
    contended: AtomicU64,
}

/// Mutual exclusion between the two reconciliation directions.
///
/// Acquisition never waits: [`SyncGate::try_acquire`] either returns a guard
/// or `None`. Cloning yields another handle to the same gate.
///
/// # Example
///
/// ```rust
/// use tabsync_engine::{Direction, SyncGate};
///
/// let gate = SyncGate::new();
/// let guard = gate.try_acquire(Direction::AToB).unwrap();
/// assert!(gate.try_acquire(Direction::BToA).is_none());
/// drop(guard);
/// assert!(gate.try_acquire(Direction::BToA).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncGate {
    lock: Arc<AsyncMutex<()>>,
    holder: Arc<Mutex<Option<Direction>>>,
    metrics: Arc<GateMetrics>,
}

impl SyncGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to take the gate for `direction` without blocking.
    pub fn try_acquire(&self, direction: Direction) -> Option<GateGuard> {
        self.metrics.attempts.fetch_add(1, Ordering::SeqCst);
        match Arc::clone(&self.lock).try_lock_owned() {
            Ok(guard) => {
                self.metrics.acquired.fetch_add(1, Ordering::SeqCst);
                *self.holder.lock() = Some(direction);
                Some(GateGuard {
                    holder: Arc::clone(&self.holder),
                    _guard: guard,
                })
            }
            Err(_) => {
                self.metrics.contended.fetch_add(1, Ordering::SeqCst);
                None
            }
        }
    }

    /// Returns the direction currently holding the gate.
    pub fn holder(&self) -> Option<Direction> {
        *self.holder.lock()
    }

    /// Returns true if some direction holds the gate.
    pub fn is_held(&self) -> bool {
        self.holder.lock().is_some()
    }

    /// Returns a copy of the usage counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            attempts: self.metrics.attempts.load(Ordering::SeqCst),
            acquired: self.metrics.acquired.load(Ordering::SeqCst),
            contended: self.metrics.contended.load(Ordering::SeqCst),
        }
    }
}

/// Proof of holding the gate. Dropping it releases the gate.
///
/// The guard is `Send`, so a pass can carry it onto a blocking thread; it is
/// released however that pass ends, unwinding included.
#[derive(Debug)]
pub struct GateGuard {
    holder: Arc<Mutex<Option<Direction>>>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        // Cleared while the lock is still held; `_guard` is released after this.
        *self.holder.lock() = None;
    }
}
