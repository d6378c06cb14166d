//! Unbounded blocking FIFO queue.
//!
//! [`BlockingQueue`] hands values off between any number of producer and
//! consumer threads. Producers never block beyond brief lock contention;
//! consumers can either park until a value arrives ([`BlockingQueue::wait_and_pop`])
//! or poll ([`BlockingQueue::try_pop`]).
//!
//! # Examples
//!
//! ```
//! use prometheus_async_log::core::BlockingQueue;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let queue = Arc::new(BlockingQueue::new());
//! let producer = Arc::clone(&queue);
//!
//! let handle = thread::spawn(move || {
//!     producer.push("a");
//!     producer.push("b");
//! });
//!
//! assert_eq!(queue.wait_and_pop(), "a");
//! assert_eq!(queue.wait_and_pop(), "b");
//! handle.join().unwrap();
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// A thread-safe, unbounded FIFO queue with blocking pop.
///
/// The queue owns a lock and a condition variable, so it is neither `Clone`
/// nor `Copy`; share it behind an `Arc` or a reference.
pub struct BlockingQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Appends `value` to the tail and wakes one blocked consumer.
    pub fn push(&self, value: T) {
        let mut items = self.items.lock();
        items.push_back(value);
        self.not_empty.notify_one();
    }

    /// Appends `value` only if `admit` returns `true`.
    ///
    /// `admit` runs while the lock is held, so its decision is ordered with
    /// every other push. A rejected value is handed back.
    ///
    /// # Errors
    ///
    /// Returns `Err(value)` when `admit` returns `false`.
    pub fn push_if(&self, value: T, admit: impl FnOnce() -> bool) -> Result<(), T> {
        let mut items = self.items.lock();
        if !admit() {
            return Err(value);
        }
        items.push_back(value);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until the queue is non-empty, then removes and returns the head.
    ///
    /// There is no timeout; the caller must guarantee that some push
    /// eventually arrives.
    pub fn wait_and_pop(&self) -> T {
        let mut items = self.items.lock();
        loop {
            if let Some(value) = items.pop_front() {
                return value;
            }
            self.not_empty.wait(&mut items);
        }
    }

    /// Like [`wait_and_pop`](Self::wait_and_pop) but gives up after `timeout`.
    ///
    /// Returns `None` if the queue stayed empty for the whole period.
    /// A `timeout` too large to represent as a deadline waits without limit.
    pub fn wait_and_pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if let Some(value) = items.pop_front() {
            return Some(value);
        }

        let Some(deadline) = Instant::now().checked_add(timeout) else {
            loop {
                self.not_empty.wait(&mut items);
                if let Some(value) = items.pop_front() {
                    return Some(value);
                }
            }
        };

        loop {
            if self.not_empty.wait_until(&mut items, deadline).timed_out() {
                return items.pop_front();
            }
            if let Some(value) = items.pop_front() {
                return Some(value);
            }
        }
    }

    /// Removes and returns the head if there is one. Never blocks.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Removes every pending value in FIFO order under a single lock acquisition.
    pub fn drain(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    /// Number of pending values. Stale as soon as it returns under concurrency.
    pub fn size(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue currently holds no values.
    pub fn empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}
