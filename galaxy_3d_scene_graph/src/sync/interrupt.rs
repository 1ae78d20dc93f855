/// Thread interruption for blocking lock waits.
///
/// Every thread owns one interrupt flag. A handle to it can be cloned and
/// sent to other threads; `interrupt()` raises the flag and wakes the
/// [`GraphLock`](super::GraphLock) the thread is currently blocked on, which
/// then gives up and reports `Error::Cancelled`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use super::graph_lock::GraphLock;

#[derive(Default)]
pub(crate) struct InterruptState {
    interrupted: AtomicBool,
    /// Lock the owning thread is blocked on, if any
    waiting_on: Mutex<Option<Arc<GraphLock>>>,
}

impl InterruptState {
    /// Consume a pending interrupt.
    pub(crate) fn take(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    pub(crate) fn begin_wait(&self, lock: &Arc<GraphLock>) {
        *self.waiting_on.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(lock));
    }

    pub(crate) fn end_wait(&self) {
        *self.waiting_on.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

thread_local! {
    static CURRENT: Arc<InterruptState> = Arc::new(InterruptState::default());
}

pub(crate) fn current_state() -> Arc<InterruptState> {
    CURRENT.with(Arc::clone)
}

/// Handle on one thread's interrupt flag.
#[derive(Clone)]
pub struct InterruptHandle {
    state: Arc<InterruptState>,
}

impl InterruptHandle {
    /// Handle for the calling thread.
    pub fn current() -> Self {
        Self { state: current_state() }
    }

    /// Raise the flag and wake the target thread if it is blocked on a graph lock.
    ///
    /// If the thread is not waiting, the interrupt stays pending and
    /// cancels its next lock acquire.
    pub fn interrupt(&self) {
        self.state.interrupted.store(true, Ordering::SeqCst);
        let lock = self
            .state
            .waiting_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(lock) = lock {
            lock.wake_all();
        }
    }

    /// Whether an interrupt is pending.
    pub fn is_interrupted(&self) -> bool {
        self.state.interrupted.load(Ordering::SeqCst)
    }

    /// Discard a pending interrupt. Returns whether one was pending.
    pub fn clear(&self) -> bool {
        self.state.take()
    }
}

impl std::fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptHandle")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}
