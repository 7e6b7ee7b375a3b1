//! Stacks and the stack of stacks
//!
//! A `Stack` is a named, shared, LIFO sequence of Values. It is the unit of
//! "current execution context": primitive operations run against whichever
//! Stack is on top of the `MetaStack`.
//!
//! A `MetaStack` is itself a Stack whose elements are Stacks, paired with a
//! stack of Objects that tracks the current receiver (`self`).
//!
//! ## Locking
//!
//! Every method takes the lock for the duration of one call and releases it
//! before returning. Operations never hold a Stack's lock while touching
//! another Stack, so a Stack that contains itself (via `@`) is safe to
//! manipulate. Concurrent mutation of one Stack from two tasks is a race at
//! the language level: each call is atomic, sequences of calls are not.

use crate::error::{Result, RuntimeError};
use crate::object::Object;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct StackData {
    name: String,
    items: Mutex<Vec<Value>>,
}

/// Shared stack handle; clones refer to the same items.
#[derive(Clone)]
pub struct Stack {
    data: Arc<StackData>,
}

fn underflow(needed: usize, depth: usize) -> RuntimeError {
    RuntimeError::StackUnderflow { needed, depth }
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Stack {
            data: Arc::new(StackData {
                name: name.into(),
                items: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.data
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock and verify at least `needed` items are present
    fn require(&self, needed: usize) -> Result<MutexGuard<'_, Vec<Value>>> {
        let items = self.lock();
        if items.len() < needed {
            return Err(underflow(needed, items.len()));
        }
        Ok(items)
    }

    pub fn push(&self, value: Value) {
        self.lock().push(value);
    }

    pub fn pop(&self) -> Result<Value> {
        let mut items = self.lock();
        let depth = items.len();
        items.pop().ok_or(underflow(1, depth))
    }

    pub fn peek(&self) -> Result<Value> {
        let items = self.lock();
        items.last().cloned().ok_or(underflow(1, items.len()))
    }

    /// Copy of the item `n` places below the top (0 = top)
    pub fn nth(&self, n: usize) -> Result<Value> {
        let items = self.require(n + 1)?;
        Ok(items[items.len() - 1 - n].clone())
    }

    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// ( a -- a a )
    pub fn dup(&self) -> Result<()> {
        let mut items = self.require(1)?;
        let top = items[items.len() - 1].clone();
        items.push(top);
        Ok(())
    }

    /// ( a -- )
    pub fn drop_top(&self) -> Result<()> {
        self.pop().map(|_| ())
    }

    /// ( a b -- b a )
    pub fn swap(&self) -> Result<()> {
        let mut items = self.require(2)?;
        let len = items.len();
        items.swap(len - 1, len - 2);
        Ok(())
    }

    /// ( a b -- a b a )
    pub fn over(&self) -> Result<()> {
        let mut items = self.require(2)?;
        let second = items[items.len() - 2].clone();
        items.push(second);
        Ok(())
    }

    /// ( a b c -- b c a )
    pub fn rot(&self) -> Result<()> {
        let mut items = self.require(3)?;
        let len = items.len();
        items[len - 3..].rotate_left(1);
        Ok(())
    }

    /// Remove the bottom element
    pub fn decap(&self) -> Result<Value> {
        let mut items = self.require(1)?;
        Ok(items.remove(0))
    }

    /// Remove every element
    pub fn purge(&self) {
        self.lock().clear();
    }

    /// Copy of the items, bottom first
    pub fn snapshot(&self) -> Vec<Value> {
        self.lock().clone()
    }

    pub fn ptr_eq(&self, other: &Stack) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("name", &self.data.name)
            .field("depth", &self.depth())
            .finish()
    }
}

/// Name given to Stacks created by `$new`
pub const SYSTEM_STACK: &str = "system";

/// The stack of execution-context Stacks, plus the receiver stack for `self`.
#[derive(Clone)]
pub struct MetaStack {
    frames: Stack,
    receivers: Arc<Mutex<Vec<Object>>>,
}

impl MetaStack {
    /// An empty MetaStack whose receiver stack holds one fresh root Object
    pub fn new() -> Self {
        MetaStack {
            frames: Stack::new("meta"),
            receivers: Arc::new(Mutex::new(vec![Object::new()])),
        }
    }

    /// A MetaStack holding one Stack named `name`
    pub fn with_root(name: impl Into<String>) -> Self {
        let meta = MetaStack::new();
        meta.push_frame(Stack::new(name));
        meta
    }

    /// The Stack whose elements are this MetaStack's frames
    pub fn frames(&self) -> &Stack {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn push_frame(&self, stack: Stack) {
        self.frames.push(Value::Stack(stack));
    }

    /// The Stack operations currently run against
    pub fn current(&self) -> Result<Stack> {
        self.frames.peek()?.into_stack("current")
    }

    /// The Stack directly beneath the current one
    pub fn previous(&self) -> Result<Stack> {
        self.frames.nth(1)?.into_stack("^")
    }

    /// Push a child Stack seeded with a reference to the current one. An
    /// empty MetaStack first gets a root Stack, then the child.
    pub fn new_frame(&self) -> Stack {
        let parent = match self.current() {
            Ok(stack) => stack,
            Err(_) => {
                let root = Stack::new(SYSTEM_STACK);
                self.push_frame(root.clone());
                root
            }
        };
        let child = Stack::new(SYSTEM_STACK);
        child.push(Value::Stack(parent));
        self.push_frame(child.clone());
        child
    }

    pub fn swap_frames(&self) -> Result<()> {
        self.frames.swap()
    }

    pub fn drop_frame(&self) -> Result<()> {
        self.frames.drop_top()
    }

    pub fn decap_frames(&self) -> Result<()> {
        self.frames.decap().map(|_| ())
    }

    fn lock_receivers(&self) -> MutexGuard<'_, Vec<Object>> {
        self.receivers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current receiver
    pub fn receiver(&self) -> Result<Object> {
        let receivers = self.lock_receivers();
        receivers.last().cloned().ok_or(underflow(1, 0))
    }

    pub fn push_receiver(&self, object: Object) {
        self.lock_receivers().push(object);
    }

    pub fn pop_receiver(&self) -> Result<Object> {
        self.lock_receivers().pop().ok_or(underflow(1, 0))
    }
}

impl Default for MetaStack {
    fn default() -> Self {
        MetaStack::new()
    }
}

impl fmt::Debug for MetaStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaStack")
            .field("depth", &self.depth())
            .field("receivers", &self.lock_receivers().len())
            .finish()
    }
}
