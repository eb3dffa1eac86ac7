// ============================================================================
// Completion Latch
// Counts outstanding transactions so producers can wait for them
// ============================================================================

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct LatchState {
    pending: Mutex<u64>,
    released: Condvar,
}

/// Countdown shared between the producer that expects transactions and the
/// book that applies them.
///
/// The producer calls [`add`](Self::add) with the number of transactions it
/// expects; the book calls [`done`](Self::done) once per applied transaction.
/// The count never goes below zero.
#[derive(Debug, Clone, Default)]
pub struct CompletionLatch {
    state: Arc<LatchState>,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, count: u64) {
        let mut pending = self.state.pending.lock();
        *pending = pending.saturating_add(count);
    }

    pub fn done(&self) {
        let mut pending = self.state.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.state.released.notify_all();
        }
    }

    pub fn pending(&self) -> u64 {
        *self.state.pending.lock()
    }

    /// Block until the count reaches zero
    pub fn wait(&self) {
        let mut pending = self.state.pending.lock();
        while *pending > 0 {
            self.state.released.wait(&mut pending);
        }
    }

    /// Block until the count reaches zero or `timeout` elapses.
    /// Returns whether the latch was released.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut pending = self.state.pending.lock();
        while *pending > 0 {
            if self
                .state
                .released
                .wait_for(&mut pending, timeout)
                .timed_out()
            {
                return *pending == 0;
            }
        }
        true
    }
}
