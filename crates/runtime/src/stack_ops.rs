//! Stack operations
//!
//! Shuffles on the current Stack, plus the ops that treat a Stack value as
//! a container. The container ops leave the target Stack where it was.

use crate::runtime::Runtime;
use blacklight_core::{Result, Stack, Value};

/// Name given to Stacks created by `news`
pub const USER_STACK: &str = "user";

/// Remove the bottom element
///
/// Stack effect: ( x ... -- ... )
pub fn decap(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.decap().map(|_| ())
}

/// Stack effect: ( ... -- ... n )
pub fn depth(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let n = stack.depth() as i64;
    stack.push(Value::Number(n));
    Ok(())
}

/// Stack effect: ( a -- )
pub fn drop(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.drop_top()
}

/// Stack effect: ( a -- a a )
pub fn dup(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.dup()
}

/// Stack effect: ( a b -- a b a )
pub fn over(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.over()
}

/// Stack effect: ( ... -- )
pub fn purge(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.purge();
    Ok(())
}

/// Stack effect: ( a b c -- b c a )
pub fn rot(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.rot()
}

/// Stack effect: ( a b -- b a )
pub fn swap(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.swap()
}

/// Stack effect: ( -- s )
pub fn new_stack(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::Stack(Stack::new(USER_STACK)));
    Ok(())
}

/// Move the top item onto the Stack beneath it
///
/// Stack effect: ( s x -- s )
pub fn push(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let item = stack.pop()?;
    let target = stack.peek()?.into_stack("push")?;
    target.push(item);
    Ok(())
}

/// Stack effect: ( s -- s x )
pub fn pop(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let target = stack.peek()?.into_stack("pop")?;
    // Popped before pushing: `target` may be `stack` itself
    let item = target.pop()?;
    stack.push(item);
    Ok(())
}

/// Stack effect: ( s -- s n )
pub fn size(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let target = stack.peek()?.into_stack("size")?;
    let n = target.depth() as i64;
    stack.push(Value::Number(n));
    Ok(())
}

/// Drop the top of the Stack on top
///
/// Stack effect: ( s -- s )
pub fn tail(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.peek()?.into_stack("tail")?.drop_top()
}
