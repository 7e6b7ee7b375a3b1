//! Runtime handle
//!
//! Owns the state every task of one interpreter shares: configuration, the
//! task tracker (join barrier), the descriptor table and the program loader.
//! Cloning is cheap; spawned tasks carry a clone.

use crate::config::RuntimeConfig;
use crate::descriptors::DescriptorTable;
use crate::dispatch;
use crate::loader::{Loader, NoLoader};
use crate::scheduler::{self, TaskFailure, TaskStats, TaskTracker};
use blacklight_core::{MetaStack, Operation, Queue, Result};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the Stack a top-level program starts on
pub const MAIN_STACK: &str = "main";

struct RuntimeInner {
    config: RuntimeConfig,
    tasks: Arc<TaskTracker>,
    descriptors: Arc<DescriptorTable>,
    loader: Arc<dyn Loader>,
}

#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

impl Runtime {
    /// Create a runtime. The first runtime in a process also applies the
    /// coroutine settings in `config` to the scheduler.
    pub fn new(config: RuntimeConfig, loader: impl Loader + 'static) -> Self {
        scheduler::configure(&config);
        Runtime {
            inner: Arc::new(RuntimeInner {
                config,
                tasks: Arc::new(TaskTracker::new()),
                descriptors: Arc::new(DescriptorTable::new()),
                loader: Arc::new(loader),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn tasks(&self) -> &Arc<TaskTracker> {
        &self.inner.tasks
    }

    pub fn descriptors(&self) -> &Arc<DescriptorTable> {
        &self.inner.descriptors
    }

    pub fn loader(&self) -> &dyn Loader {
        self.inner.loader.as_ref()
    }

    /// A fresh queue with the configured capacity
    pub fn new_queue(&self) -> Queue {
        Queue::new(self.inner.config.queue_capacity)
    }

    /// Evaluate `ops` against `meta` and hand the MetaStack back.
    ///
    /// Unknown operation names are logged and skipped; any other error
    /// stops evaluation and is returned with the stacks as they were at the
    /// failing operation.
    pub fn eval(&self, meta: MetaStack, ops: &[Operation]) -> Result<MetaStack> {
        dispatch::eval(&meta, ops, self)?;
        Ok(meta)
    }

    /// Evaluate `ops` in a fresh root context
    pub fn run(&self, ops: &[Operation]) -> Result<MetaStack> {
        self.eval(MetaStack::with_root(MAIN_STACK), ops)
    }

    /// Load `name` through the loader and run it in a fresh root context
    pub fn run_program(&self, name: &str) -> Result<MetaStack> {
        let ops = self.loader().load(name)?;
        debug!(program = name, ops = ops.len(), "running program");
        self.run(&ops)
    }

    /// Block until every spawned task has finished, returning the failures
    /// recorded since the last wait.
    pub fn wait_all(&self) -> Vec<TaskFailure> {
        let failures = self.inner.tasks.wait_all();
        if !failures.is_empty() {
            warn!(failed = failures.len(), "background tasks failed before wait");
        }
        failures
    }

    pub fn stats(&self) -> TaskStats {
        self.inner.tasks.stats()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(RuntimeConfig::default(), NoLoader)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("tasks", &self.inner.tasks.stats())
            .field("descriptors", &self.inner.descriptors.len())
            .finish()
    }
}
