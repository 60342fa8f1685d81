//! Bounded blocking hand-off queue between producer and consumer threads.
//!
//! `write` never blocks — the bound is advisory, modelling back-pressure that
//! this system does not actually enforce (see spec §5). `read` blocks until a
//! value is available or the channel is closed and drained. `close` is the
//! only way a blocked reader wakes up with no value.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct Inner<T> {
    queue: VecDeque<T>,
    closed: bool,
}

pub struct BlockingChannel<T> {
    state: Mutex<Inner<T>>,
    cv: Condvar,
}

impl<T> Default for BlockingChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockingChannel<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Inner {
                queue: VecDeque::new(),
                closed: false,
            }),
            cv: Condvar::new(),
        }
    }

    /// Enqueues `value`. Silent no-op once the channel is closed.
    pub fn write(&self, value: T) {
        let mut inner = self.state.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.queue.push_back(value);
        self.cv.notify_one();
    }

    /// Blocks until a value is available, returning `None` only once the
    /// channel is closed and empty.
    pub fn read(&self) -> Option<T> {
        let mut inner = self.state.lock().unwrap();
        loop {
            if let Some(value) = inner.queue.pop_front() {
                return Some(value);
            }
            if inner.closed {
                return None;
            }
            inner = self.cv.wait(inner).unwrap();
        }
    }

    /// Idempotent. Wakes every blocked reader; subsequent `write`s are no-ops.
    pub fn close(&self) {
        let mut inner = self.state.lock().unwrap();
        inner.closed = true;
        self.cv.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}
