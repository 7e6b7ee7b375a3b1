//! Prototype objects
//!
//! An Object is a mutable slot table with an optional parent. Lookups fall
//! back to the parent chain; writes always land in the local table, so a
//! child shadows inherited slots without touching its ancestors. Parents are
//! only assigned when a child is created from an existing object, which keeps
//! the chain acyclic.

use crate::error::{Result, RuntimeError};
use crate::value::{Value, Word};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct ObjectData {
    slots: HashMap<Word, Value>,
    parent: Option<Object>,
}

/// Shared object handle; clones refer to the same slot table.
#[derive(Clone)]
pub struct Object {
    data: Arc<Mutex<ObjectData>>,
}

impl Object {
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Object>) -> Self {
        Object {
            data: Arc::new(Mutex::new(ObjectData {
                slots: HashMap::new(),
                parent,
            })),
        }
    }

    /// Create an empty object that delegates to `self`
    pub fn child(&self) -> Object {
        Self::with_parent(Some(self.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, ObjectData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a slot in this object's own table
    pub fn set(&self, slot: Word, value: Value) {
        self.lock().slots.insert(slot, value);
    }

    /// Look up a slot locally, then along the parent chain
    pub fn fetch(&self, slot: &Word) -> Result<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let data = current.lock();
                if let Some(value) = data.slots.get(slot) {
                    return Ok(value.clone());
                }
                data.parent.clone()
            };
            match parent {
                Some(p) => current = p,
                None => return Err(RuntimeError::SlotNotFound(slot.to_string())),
            }
        }
    }

    pub fn has_local(&self, slot: &Word) -> bool {
        self.lock().slots.contains_key(slot)
    }

    pub fn parent(&self) -> Option<Object> {
        self.lock().parent.clone()
    }

    pub fn slot_count(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::new()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.lock();
        let mut slots: Vec<&str> = data.slots.keys().map(Word::as_str).collect();
        slots.sort_unstable();
        f.debug_struct("Object")
            .field("slots", &slots)
            .field("has_parent", &data.parent.is_some())
            .finish()
    }
}
