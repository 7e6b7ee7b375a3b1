//! Arithmetic and conversion operations
//!
//! The second item from the top is the left operand: `7 2 sub` is 5.
//!
//! # Overflow Behavior
//!
//! All arithmetic uses **wrapping semantics**:
//! - `add`: i64::MAX + 1 wraps to i64::MIN
//! - `sub`: i64::MIN - 1 wraps to i64::MAX
//! - `mul`: overflow wraps around
//! - `div`: i64::MIN / -1 wraps to i64::MIN
//!
//! Division and remainder by zero fail with `DivisionByZero`.

use crate::runtime::Runtime;
use blacklight_core::{Char, Result, RuntimeError, Stack, Value};

/// Pop the right then the left operand
fn pop_two(stack: &Stack, op: &'static str) -> Result<(i64, i64)> {
    let right = stack.pop()?.into_number(op)?;
    let left = stack.pop()?.into_number(op)?;
    Ok((left, right))
}

fn binary(stack: &Stack, op: &'static str, f: fn(i64, i64) -> Result<i64>) -> Result<()> {
    let (left, right) = pop_two(stack, op)?;
    stack.push(Value::Number(f(left, right)?));
    Ok(())
}

/// Stack effect: ( a b -- a+b )
pub fn add(stack: &Stack, _rt: &Runtime) -> Result<()> {
    binary(stack, "add", |a, b| Ok(a.wrapping_add(b)))
}

/// Stack effect: ( a b -- a-b )
pub fn sub(stack: &Stack, _rt: &Runtime) -> Result<()> {
    binary(stack, "sub", |a, b| Ok(a.wrapping_sub(b)))
}

/// Stack effect: ( a b -- a*b )
pub fn mul(stack: &Stack, _rt: &Runtime) -> Result<()> {
    binary(stack, "mul", |a, b| Ok(a.wrapping_mul(b)))
}

/// Truncating division
///
/// Stack effect: ( a b -- a/b )
pub fn div(stack: &Stack, _rt: &Runtime) -> Result<()> {
    binary(stack, "div", |a, b| {
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { op: "div" });
        }
        Ok(a.wrapping_div(b))
    })
}

/// Remainder, with the sign of the left operand
///
/// Stack effect: ( a b -- a%b )
pub fn rem(stack: &Stack, _rt: &Runtime) -> Result<()> {
    binary(stack, "mod", |a, b| {
        if b == 0 {
            return Err(RuntimeError::DivisionByZero { op: "mod" });
        }
        Ok(a.wrapping_rem(b))
    })
}

/// Character with the given code point
///
/// Stack effect: ( n -- c )
pub fn n_to_c(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let n = stack.pop()?.into_number("n-to-c")?;
    stack.push(Value::Char(Char::from_code("n-to-c", n)?));
    Ok(())
}

/// Decimal text of a number
///
/// Stack effect: ( n -- cv )
pub fn n_to_cv(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let n = stack.pop()?.into_number("n-to-cv")?;
    stack.push(Value::text(n.to_string()));
    Ok(())
}

/// Stack effect: ( c -- cv )
pub fn c_to_cv(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let c = stack.pop()?.into_char("c-to-cv")?;
    stack.push(Value::text(c.printable()));
    Ok(())
}

/// Code point of a character
///
/// Stack effect: ( c -- n )
pub fn c_to_n(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let c = stack.pop()?.into_char("c-to-n")?;
    stack.push(Value::Number(c.code()));
    Ok(())
}
