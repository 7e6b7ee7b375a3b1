//! Bounded MPMC queue for message passing between tasks
//!
//! Queues are the only synchronization the language exposes: tasks hand
//! values to each other through them, and the I/O pumps use them as the
//! substrate for file reads and writes.
//!
//! ## Blocking
//!
//! `enqueue` and `dequeue` block cooperatively using May's `Mutex` and
//! `Condvar`. Inside a coroutine the task yields to the scheduler instead of
//! parking the worker thread; on a plain OS thread (the root task) they park
//! the thread as usual.
//!
//! ## Termination conventions
//!
//! - A read pump enqueues a nil Tag once at end of file.
//! - A producer enqueues a nil value to tell a write pump to close.
//!
//! Neither is enforced here; the queue carries any Value.

use crate::value::Value;
use may::sync::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, PoisonError};

/// Capacity used when the embedder does not configure one
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

struct QueueState {
    items: Mutex<VecDeque<Value>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

/// Shared queue handle; clones refer to the same queue.
#[derive(Clone)]
pub struct Queue {
    state: Arc<QueueState>,
}

impl Queue {
    /// Create a queue holding at most `capacity` items (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Queue {
            state: Arc::new(QueueState {
                items: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                capacity,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Value>> {
        self.state
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a value, blocking while the queue is full
    pub fn enqueue(&self, value: Value) {
        let mut items = self.lock();
        while items.len() >= self.state.capacity {
            items = self
                .state
                .not_full
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
        items.push_back(value);
        drop(items);
        self.state.not_empty.notify_one();
    }

    /// Remove the oldest value, blocking while the queue is empty
    pub fn dequeue(&self) -> Value {
        let mut items = self.lock();
        loop {
            if let Some(value) = items.pop_front() {
                drop(items);
                self.state.not_full.notify_one();
                return value;
            }
            items = self
                .state
                .not_empty
                .wait(items)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove the oldest value if one is available right now
    pub fn try_dequeue(&self) -> Option<Value> {
        let value = self.lock().pop_front();
        if value.is_some() {
            self.state.not_full.notify_one();
        }
        value
    }

    /// Remove and return everything currently available without waiting
    pub fn drain(&self) -> Vec<Value> {
        let drained: Vec<Value> = self.lock().drain(..).collect();
        if !drained.is_empty() {
            self.state.not_full.notify_all();
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    pub fn ptr_eq(&self, other: &Queue) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for Queue {
    fn default() -> Self {
        Queue::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len())
            .field("capacity", &self.state.capacity)
            .finish()
    }
}
