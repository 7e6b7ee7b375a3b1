//! MetaStack operations
//!
//! These rearrange the stack of execution contexts, or expose contexts as
//! values on the current Stack.

use crate::runtime::Runtime;
use blacklight_core::{MetaStack, Result, Value};

/// Push the current Stack onto itself
pub fn push_current(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    current.push(Value::Stack(current.clone()));
    Ok(())
}

/// Push the Stack beneath the current one onto the current one
pub fn push_previous(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    let previous = meta.previous()?;
    meta.current()?.push(Value::Stack(previous));
    Ok(())
}

/// Push the MetaStack's own frame Stack onto the current one
pub fn push_meta(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    meta.current()?.push(Value::Stack(meta.frames().clone()));
    Ok(())
}

pub fn decap(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    meta.decap_frames()
}

pub fn drop(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    meta.drop_frame()
}

/// Enter a new context seeded with the previous one
pub fn new_frame(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    meta.new_frame();
    Ok(())
}

pub fn swap(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    meta.swap_frames()
}

/// Push the current receiver Object
pub fn receiver(meta: &MetaStack, _rt: &Runtime) -> Result<()> {
    let object = meta.receiver()?;
    meta.current()?.push(Value::Object(object));
    Ok(())
}
