//! Logic operations
//!
//! Truth is a Tag: any Tag whose kind is not `nil` counts as true.

use crate::runtime::Runtime;
use blacklight_core::{Result, Stack, Value};

/// Structural equality (identity for handles). Keeps the second operand.
///
/// Stack effect: ( a b -- a t )
pub fn eq(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let right = stack.pop()?;
    let left = stack.peek()?;
    stack.push(Value::boolean(left == right, "eq"));
    Ok(())
}

/// Invert a truth value. Anything that is not a nil Tag counts as true.
///
/// Stack effect: ( t -- t' )
pub fn not(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let value = stack.pop()?;
    stack.push(Value::boolean(value.is_nil(), "not"));
    Ok(())
}

/// Stack effect: ( -- nil )
pub fn nil(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::nil("nil"));
    Ok(())
}

/// Stack effect: ( -- true )
pub fn truth(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::truth("true"));
    Ok(())
}
