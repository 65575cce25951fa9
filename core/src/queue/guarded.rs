//! queue/guarded.rs
//! Mutex-guarded ring buffer with condition-based admission.
//!
//! The whole queue state (indices + slots + closed flag) lives behind one
//! mutex. Producers sleep on `not_full` until the admission margin is met,
//! consumers sleep on `not_empty`. No spinning.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::trace;

use super::ring::RingBuffer;
use super::types::{AdmissionMargin, QueueError};

/// Result of a bounded push attempt. A deferred item is handed back untouched.
#[derive(Debug)]
pub enum PushAttempt<T> {
    Pushed,
    Deferred(T),
}

/// How a successful push got admitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Admitted {
    /// Times the producer went to sleep before the margin was met.
    pub waits: u32,
}

#[derive(Debug)]
struct QueueState<T> {
    ring: RingBuffer<T>,
    closed: bool,
}

#[derive(Debug)]
pub struct BlockQueue<T> {
    name: &'static str,
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> BlockQueue<T> {
    pub fn new(name: &'static str, capacity: usize) -> Result<Self, QueueError> {
        Ok(Self {
            name,
            state: Mutex::new(QueueState {
                ring: RingBuffer::new(name, capacity)?,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    pub fn count(&self) -> usize {
        self.state.lock().ring.count()
    }

    pub fn available(&self) -> usize {
        self.state.lock().ring.available()
    }

    /// `(count, available)` observed under a single lock acquisition.
    pub fn observe(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.ring.count(), state.ring.available())
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Wait until `margin` admits a write, then build the item under the lock
    /// and push it.
    ///
    /// Building inside the critical section keeps item construction (sequence
    /// numbering, key copy) ordered with the push itself.
    pub fn push_with<F>(&self, margin: AdmissionMargin, build: F) -> Result<Admitted, QueueError>
    where
        F: FnOnce() -> T,
    {
        let mut state = self.state.lock();
        let mut admitted = Admitted::default();

        loop {
            if state.closed {
                return Err(QueueError::Closed { queue: self.name });
            }
            if margin.admits(state.ring.available()) {
                break;
            }
            admitted.waits += 1;
            trace!("[QUEUE] {} below margin {}, producer waiting", self.name, margin.0);
            self.not_full.wait(&mut state);
        }

        state.ring.push(build())?;
        drop(state);
        self.not_empty.notify_one();
        Ok(admitted)
    }

    /// Push `item` if `margin` admits it within `wait`; otherwise hand it back.
    pub fn offer(
        &self,
        item: T,
        margin: AdmissionMargin,
        wait: Duration,
    ) -> Result<PushAttempt<T>, QueueError> {
        let deadline = Instant::now() + wait;
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return Err(QueueError::Closed { queue: self.name });
            }
            if margin.admits(state.ring.available()) {
                break;
            }
            if self.not_full.wait_until(&mut state, deadline).timed_out() {
                if state.closed {
                    return Err(QueueError::Closed { queue: self.name });
                }
                if !margin.admits(state.ring.available()) {
                    return Ok(PushAttempt::Deferred(item));
                }
                break;
            }
        }

        state.ring.push(item)?;
        drop(state);
        self.not_empty.notify_one();
        Ok(PushAttempt::Pushed)
    }

    /// Block until an item is available or the queue is closed.
    pub fn pop(&self) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(QueueError::Closed { queue: self.name });
            }
            if let Some(item) = self.take(&mut state) {
                return Ok(item);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Wait at most `wait` for an item. `Ok(None)` means the wait elapsed.
    pub fn pop_timeout(&self, wait: Duration) -> Result<Option<T>, QueueError> {
        let deadline = Instant::now() + wait;
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(QueueError::Closed { queue: self.name });
            }
            if let Some(item) = self.take(&mut state) {
                return Ok(Some(item));
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                return Ok(self.take(&mut state));
            }
        }
    }

    /// Shut the queue down and wake every waiter.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            trace!("[QUEUE] {} closed with {} item(s) left", self.name, state.ring.count());
        }
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    // Pops are gated by a count check, so `RingBuffer::pop` never sees an empty ring here.
    fn take(&self, state: &mut MutexGuard<'_, QueueState<T>>) -> Option<T> {
        if state.ring.count() == 0 {
            return None;
        }
        let item = state.ring.pop();
        if item.is_some() {
            // Producers wait on different margins; let each re-check its own.
            self.not_full.notify_all();
        }
        item
    }
}
