//! Scheduler - Task Management with May
//!
//! Every `bkg`, `work` and `co`, and every I/O pump, runs as a May coroutine
//! (a "task"). Tasks share process memory and only suspend at blocking queue
//! operations and at the join barrier.
//!
//! ## Lifecycle tracking
//!
//! The tracker counts active tasks under a coroutine-aware mutex and wakes
//! joiners through a condition variable when the count changes, so `wait`
//! is event driven rather than polling. Lifetime statistics (spawned,
//! completed, failed, peak) are lock-free atomics.
//!
//! ## Failure boundary
//!
//! A task's body returns `Result<()>`. An `Err` (or a panic) is logged and
//! recorded as a `TaskFailure`; it never takes down sibling tasks or the
//! process. `join` leaves recorded failures in place; `wait_all` joins and
//! hands them to the caller.
//!
//! ## Cancellation
//!
//! There is none. A task runs until its body returns; a `loop` without an
//! exit inside it runs for the life of the process.

use crate::config::RuntimeConfig;
use blacklight_core::{Result, RuntimeError};
use may::coroutine;
use may::sync::{Condvar, Mutex, MutexGuard};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Once, PoisonError};
use tracing::{debug, error};

static SCHEDULER_INIT: Once = Once::new();

/// Apply coroutine settings to May. Only the first call in a process has
/// any effect; May reads its config when the scheduler starts.
pub fn configure(config: &RuntimeConfig) {
    SCHEDULER_INIT.call_once(|| {
        let may_config = may::config();
        may_config
            .set_stack_size(config.stack_size)
            .set_pool_capacity(config.pool_capacity);
        if config.workers > 0 {
            may_config.set_workers(config.workers);
        }
        debug!(
            stack_size = config.stack_size,
            pool_capacity = config.pool_capacity,
            workers = config.workers,
            "scheduler configured"
        );
    });
}

// Coroutine-local rather than thread-local: May coroutines can migrate
// between OS threads. Outside a coroutine (the root task) this reads false.
may::coroutine_local!(static IN_TASK: Cell<bool> = Cell::new(false));

/// True when called from inside a spawned task
pub fn in_task() -> bool {
    IN_TASK.with(|cell| cell.get())
}

/// Why a task stopped early
#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    Error(RuntimeError),
    Panic,
}

/// A background task that ended with an error
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub task: u64,
    pub name: String,
    pub cause: FailureCause,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            FailureCause::Error(e) => write!(f, "task {} ({}) failed: {}", self.task, self.name, e),
            FailureCause::Panic => write!(f, "task {} ({}) panicked", self.task, self.name),
        }
    }
}

/// Snapshot of task counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub active: usize,
    pub spawned: u64,
    pub completed: u64,
    pub failed: u64,
    pub peak: usize,
}

#[derive(Default)]
struct BarrierState {
    /// Tasks spawned and not yet finished
    active: usize,
    /// Of those, how many are themselves blocked in `wait_all`
    waiting: usize,
}

/// Join barrier and bookkeeping for every task of one runtime.
pub struct TaskTracker {
    barrier: Mutex<BarrierState>,
    changed: Condvar,
    failures: std::sync::Mutex<Vec<TaskFailure>>,
    next_id: AtomicU64,
    spawned: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    peak: AtomicUsize,
}

impl Default for TaskTracker {
    fn default() -> Self {
        TaskTracker {
            barrier: Mutex::new(BarrierState::default()),
            changed: Condvar::new(),
            failures: std::sync::Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            spawned: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

/// Opaque handle to a spawned task.
///
/// The language never sees these; dropping one detaches the task. Hosts can
/// keep them to join individual tasks during shutdown.
pub struct TaskHandle {
    id: u64,
    name: String,
    join: coroutine::JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the task ends. False if it panicked.
    pub fn join(self) -> bool {
        self.join.join().is_ok()
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Decrements the active count when the task ends, even by panic
struct TaskGuard {
    tracker: Arc<TaskTracker>,
    id: u64,
    name: String,
    outcome: Option<Result<()>>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let failure = match self.outcome.take() {
            Some(Ok(())) => None,
            Some(Err(e)) => Some(FailureCause::Error(e)),
            None => Some(FailureCause::Panic),
        };
        match failure {
            Some(cause) => self.tracker.record_failure(TaskFailure {
                task: self.id,
                name: std::mem::take(&mut self.name),
                cause,
            }),
            None => debug!(task = self.id, name = %self.name, "task finished"),
        }
        self.tracker.leave();
    }
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.barrier.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self) {
        let mut state = self.lock();
        state.active += 1;
        let active = state.active;
        drop(state);

        self.spawned.fetch_add(1, Ordering::Relaxed);
        self.peak.fetch_max(active, Ordering::AcqRel);
    }

    fn leave(&self) {
        let mut state = self.lock();
        state.active -= 1;
        // Counted under the lock so a joiner never sees active and
        // completed disagree
        self.completed.fetch_add(1, Ordering::Release);
        drop(state);

        self.changed.notify_all();
    }

    fn record_failure(&self, failure: TaskFailure) {
        error!("{}", failure);
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
    }

    /// Run `body` as a new task.
    ///
    /// Returns immediately. The task counts toward the join barrier until
    /// `body` returns; an `Err` from `body` is recorded as a failure.
    pub fn spawn<F>(self: &Arc<Self>, name: impl Into<String>, body: F) -> TaskHandle
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = name.into();
        self.enter();
        debug!(task = id, name = %name, "task spawned");

        let guard = TaskGuard {
            tracker: Arc::clone(self),
            id,
            name: name.clone(),
            outcome: None,
        };

        // SAFETY: the closure owns everything it touches (Arc'd handles and
        // cloned values) and uses no thread-local state, so it may run on any
        // worker thread. Coroutine stack size is set by `configure`.
        let join = unsafe {
            coroutine::spawn(move || {
                let mut guard = guard;
                IN_TASK.with(|cell| cell.set(true));
                let outcome = body();
                guard.outcome = Some(outcome);
                drop(guard);
            })
        };

        TaskHandle { id, name, join }
    }

    /// Block until every task has finished, then hand back (and clear) the
    /// failures recorded so far.
    pub fn wait_all(&self) -> Vec<TaskFailure> {
        self.join();
        self.take_failures()
    }

    /// Block until every task has finished. Recorded failures stay on the
    /// tracker for the next `wait_all` or `take_failures`.
    ///
    /// From the root this waits for the active count to reach zero. From
    /// inside a task the caller excludes itself and every other task that is
    /// also blocked here, so two tasks waiting at once release each other
    /// once everything else is done.
    pub fn join(&self) {
        let from_task = in_task();
        let mut state = self.lock();
        if from_task {
            state.waiting += 1;
            self.changed.notify_all();
        }
        loop {
            let others = if from_task { state.waiting } else { 0 };
            if state.active <= others {
                break;
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if from_task {
            state.waiting -= 1;
        }
    }

    /// Failures recorded since the last call
    pub fn take_failures(&self) -> Vec<TaskFailure> {
        std::mem::take(&mut *self.failures.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn active(&self) -> usize {
        self.lock().active
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            active: self.active(),
            spawned: self.spawned.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Acquire),
            failed: self.failed.load(Ordering::Relaxed),
            peak: self.peak.load(Ordering::Acquire),
        }
    }
}
