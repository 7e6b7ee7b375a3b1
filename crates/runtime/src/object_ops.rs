//! Object operations
//!
//! Slots are keyed by Word. `set` always writes the receiver's own table;
//! `fetch` falls back to ancestors.

use crate::runtime::Runtime;
use blacklight_core::{Object, Result, Stack, Value};

/// Stack effect: ( -- o )
pub fn o_new(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::Object(Object::new()));
    Ok(())
}

/// Stack effect: ( o x w -- o )
pub fn set(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let slot = stack.pop()?.into_word("set")?;
    let value = stack.pop()?;
    let object = stack.peek()?.into_object("set")?;
    object.set(slot, value);
    Ok(())
}

/// Stack effect: ( o w -- o x )
pub fn fetch(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let slot = stack.pop()?.into_word("fetch")?;
    let object = stack.peek()?.into_object("fetch")?;
    stack.push(object.fetch(&slot)?);
    Ok(())
}

/// New Object delegating to the one on top
///
/// Stack effect: ( o -- o child )
pub fn child(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let parent = stack.peek()?.into_object("child")?;
    stack.push(Value::Object(parent.child()));
    Ok(())
}
