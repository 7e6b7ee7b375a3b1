//! Program loaders
//!
//! `do` and `co` name a program unit; the runtime asks its `Loader` for the
//! operations. Turning files into operations (reading, lexing, parsing) is
//! the host's job, so hosts plug in their own `Loader`.

use blacklight_core::{Operation, Result, RuntimeError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Source of program units, shared by every task of a runtime.
pub trait Loader: Send + Sync {
    /// Produce the operations for `name`, or a `RuntimeError::Load`
    fn load(&self, name: &str) -> Result<Arc<[Operation]>>;
}

/// Loader that knows no programs; `do` and `co` always fail with a load error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoader;

impl Loader for NoLoader {
    fn load(&self, name: &str) -> Result<Arc<[Operation]>> {
        Err(RuntimeError::Load {
            name: name.to_string(),
            reason: "no loader configured".to_string(),
        })
    }
}

/// In-memory table of program units, for embedders and tests.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    units: RwLock<HashMap<String, Arc<[Operation]>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a unit
    pub fn insert(&self, name: impl Into<String>, ops: Vec<Operation>) {
        self.units
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::from(ops));
    }

    pub fn with_unit(self, name: impl Into<String>, ops: Vec<Operation>) -> Self {
        self.insert(name, ops);
        self
    }
}

impl Loader for MemoryLoader {
    fn load(&self, name: &str) -> Result<Arc<[Operation]>> {
        self.units
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::Load {
                name: name.to_string(),
                reason: "unit not found".to_string(),
            })
    }
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<Arc<[Operation]>> + Send + Sync,
{
    fn load(&self, name: &str) -> Result<Arc<[Operation]>> {
        self(name)
    }
}
