/// GraphLock — the single read-write lock of a spatial graph.
///
/// Any number of readers or one writer. The writer may re-acquire the write
/// lock (depth counted) and may also take read locks; a reader may take more
/// read locks. Waiting writers do not hold back new readers.
///
/// Every acquire is interruptible through [`InterruptHandle`](super::InterruptHandle):
/// an interrupt pending on entry or raised during the wait takes nothing and
/// returns `Error::Cancelled`.
///
/// The lock guards no data itself. Guards are RAII values that release on drop
/// and keep the lock alive through an `Arc`.

use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graph_err;
use super::interrupt;

const SOURCE: &str = "galaxy3d::GraphLock";

#[derive(Default)]
struct LockState {
    /// Read holds per thread
    readers: FxHashMap<ThreadId, usize>,
    writer: Option<ThreadId>,
    write_depth: usize,
}

impl LockState {
    fn can_read(&self, me: ThreadId) -> bool {
        self.writer.map_or(true, |writer| writer == me)
    }

    fn can_write(&self, me: ThreadId) -> bool {
        match self.writer {
            Some(writer) => writer == me,
            None => self.readers.is_empty(),
        }
    }
}

/// Reentrant, interruptible read-write lock.
pub struct GraphLock {
    state: Mutex<LockState>,
    released: Condvar,
}

impl Default for GraphLock {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphLock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            released: Condvar::new(),
        }
    }

    /// Block until a read lock is granted.
    ///
    /// Granted immediately when no thread writes, or when the calling thread
    /// is the writer.
    pub fn acquire_read(self: &Arc<Self>) -> Result<ReadLock> {
        let me = thread::current().id();
        let mut state = self.wait_until(|state| state.can_read(me))?;
        *state.readers.entry(me).or_insert(0) += 1;
        drop(state);

        Ok(ReadLock {
            lock: Arc::clone(self),
            thread: me,
            _not_send: PhantomData,
        })
    }

    /// Block until the write lock is granted. Reentrant.
    ///
    /// Asking for the write lock while holding only read locks would wait on
    /// the caller itself, so it fails with `ConsistencyViolation` instead.
    pub fn acquire_write(self: &Arc<Self>) -> Result<WriteLock> {
        let me = thread::current().id();
        {
            let state = self.lock_state();
            if state.writer.is_none() && state.readers.contains_key(&me) {
                return Err(graph_err!(
                    SOURCE,
                    ConsistencyViolation,
                    "Write lock requested by a thread holding a read lock"
                ));
            }
        }

        let mut state = self.wait_until(|state| state.can_write(me))?;
        state.writer = Some(me);
        state.write_depth += 1;
        drop(state);

        Ok(WriteLock {
            lock: Arc::clone(self),
            _not_send: PhantomData,
        })
    }

    // ===== DIAGNOSTICS =====

    /// Whether the calling thread holds the write lock.
    pub fn holds_write(&self) -> bool {
        self.lock_state().writer == Some(thread::current().id())
    }

    /// Whether any thread holds the write lock.
    pub fn is_write_locked(&self) -> bool {
        self.lock_state().writer.is_some()
    }

    /// Total read holds across all threads.
    pub fn reader_count(&self) -> usize {
        self.lock_state().readers.values().sum()
    }

    /// Nesting depth of the current write hold (0 when unlocked).
    pub fn write_depth(&self) -> usize {
        self.lock_state().write_depth
    }

    // ===== INTERNALS =====

    /// The state mutex is never held across user code, so a poisoned state
    /// is still consistent.
    fn lock_state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_until<F>(self: &Arc<Self>, ready: F) -> Result<MutexGuard<'_, LockState>>
    where
        F: Fn(&LockState) -> bool,
    {
        let interrupt = interrupt::current_state();
        if interrupt.take() {
            return Err(graph_err!(SOURCE, Cancelled));
        }

        let mut state = self.lock_state();
        if ready(&*state) {
            return Ok(state);
        }

        // Register before the next flag check, so an interrupt raised from
        // here on either sees this lock or is seen by the check.
        interrupt.begin_wait(self);

        loop {
            if interrupt.take() {
                drop(state);
                interrupt.end_wait();
                return Err(graph_err!(SOURCE, Cancelled));
            }

            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);

            if ready(&*state) {
                interrupt.end_wait();
                return Ok(state);
            }
        }
    }

    /// Wake every waiter so it re-checks its condition and interrupt flag.
    pub(crate) fn wake_all(&self) {
        let _state = self.lock_state();
        self.released.notify_all();
    }

    fn release_read(&self, thread: ThreadId) {
        let mut state = self.lock_state();
        if let Some(count) = state.readers.get_mut(&thread) {
            *count -= 1;
            if *count == 0 {
                state.readers.remove(&thread);
            }
        }
        let free = state.readers.is_empty();
        drop(state);

        if free {
            self.released.notify_all();
        }
    }

    fn release_write(&self) {
        let mut state = self.lock_state();
        state.write_depth = state.write_depth.saturating_sub(1);
        if state.write_depth > 0 {
            return;
        }
        state.writer = None;
        drop(state);

        self.released.notify_all();
    }
}

impl std::fmt::Debug for GraphLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("GraphLock")
            .field("readers", &state.readers.values().sum::<usize>())
            .field("writer", &state.writer)
            .field("write_depth", &state.write_depth)
            .finish()
    }
}

// ===== GUARDS =====

/// Read hold on a [`GraphLock`]. Released on drop, on the acquiring thread.
#[must_use = "the read lock is released as soon as the guard is dropped"]
pub struct ReadLock {
    lock: Arc<GraphLock>,
    thread: ThreadId,
    _not_send: PhantomData<*const ()>,
}

impl ReadLock {
    pub fn lock(&self) -> &Arc<GraphLock> {
        &self.lock
    }
}

impl Drop for ReadLock {
    fn drop(&mut self) {
        self.lock.release_read(self.thread);
    }
}

impl std::fmt::Debug for ReadLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadLock").field("thread", &self.thread).finish()
    }
}

/// Write hold on a [`GraphLock`]. Released on drop, on the acquiring thread.
#[must_use = "the write lock is released as soon as the guard is dropped"]
pub struct WriteLock {
    lock: Arc<GraphLock>,
    _not_send: PhantomData<*const ()>,
}

impl WriteLock {
    pub fn lock(&self) -> &Arc<GraphLock> {
        &self.lock
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

impl std::fmt::Debug for WriteLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteLock").finish()
    }
}

#[cfg(test)]
#[path = "graph_lock_tests.rs"]
mod tests;
