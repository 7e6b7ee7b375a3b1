//! Vector operations
//!
//! Vectors and CharVectors are immutable: `cat`, `app` and `rmo` build new
//! values. Every op accepts either kind; a CharVector's elements are Chars.

use crate::runtime::Runtime;
use blacklight_core::{Char, Result, RuntimeError, Stack, Value};
use std::sync::Arc;

const VECTOR: &str = "Vector or CharVector";

/// Index into a sequence of length `len`
fn position(op: &'static str, index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(RuntimeError::IndexOutOfRange { op, index, len })
}

/// Stack effect: ( -- v )
pub fn new_vector(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::vector(Vec::new()));
    Ok(())
}

/// Stack effect: ( -- cv )
pub fn new_char_vector(stack: &Stack, _rt: &Runtime) -> Result<()> {
    stack.push(Value::text(""));
    Ok(())
}

/// Concatenate; both operands must be the same kind
///
/// Stack effect: ( a b -- a++b )
pub fn cat(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let right = stack.pop()?;
    let left = stack.pop()?;
    let joined = match (left, right) {
        (Value::Vector(a), Value::Vector(b)) => {
            Value::Vector(a.iter().chain(b.iter()).cloned().collect())
        }
        (Value::CharVector(a), Value::CharVector(b)) => {
            Value::CharVector(Arc::from(format!("{}{}", a, b)))
        }
        (Value::Vector(_), other) => {
            return Err(RuntimeError::type_mismatch("cat", "Vector", other.kind()));
        }
        (Value::CharVector(_), other) => {
            return Err(RuntimeError::type_mismatch("cat", "CharVector", other.kind()));
        }
        (other, _) => return Err(RuntimeError::type_mismatch("cat", VECTOR, other.kind())),
    };
    stack.push(joined);
    Ok(())
}

/// Append one item
///
/// Stack effect: ( v x -- v' )
pub fn app(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let item = stack.pop()?;
    let appended = match stack.pop()? {
        Value::Vector(items) => {
            let mut items = items.to_vec();
            items.push(item);
            Value::vector(items)
        }
        Value::CharVector(text) => {
            let c = item.into_char("app")?;
            let mut text = text.to_string();
            text.push(c.0);
            Value::text(text)
        }
        other => return Err(RuntimeError::type_mismatch("app", VECTOR, other.kind())),
    };
    stack.push(appended);
    Ok(())
}

/// Item at index `n`, leaving the vector in place
///
/// Stack effect: ( v n -- v x )
pub fn ato(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let index = stack.pop()?.into_number("ato")?;
    let item = match stack.peek()? {
        Value::Vector(items) => items[position("ato", index, items.len())?].clone(),
        Value::CharVector(text) => {
            let len = text.chars().count();
            let i = position("ato", index, len)?;
            text.chars().nth(i).map(|c| Value::Char(Char(c))).ok_or(
                RuntimeError::IndexOutOfRange {
                    op: "ato",
                    index,
                    len,
                },
            )?
        }
        other => return Err(RuntimeError::type_mismatch("ato", VECTOR, other.kind())),
    };
    stack.push(item);
    Ok(())
}

/// Remove the item at index `n`
///
/// Stack effect: ( v n -- v' )
pub fn rmo(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let index = stack.pop()?.into_number("rmo")?;
    let removed = match stack.pop()? {
        Value::Vector(items) => {
            let i = position("rmo", index, items.len())?;
            let mut items = items.to_vec();
            items.remove(i);
            Value::vector(items)
        }
        Value::CharVector(text) => {
            let i = position("rmo", index, text.chars().count())?;
            let text: String = text
                .chars()
                .enumerate()
                .filter_map(|(n, c)| (n != i).then_some(c))
                .collect();
            Value::text(text)
        }
        other => return Err(RuntimeError::type_mismatch("rmo", VECTOR, other.kind())),
    };
    stack.push(removed);
    Ok(())
}

/// Stack effect: ( v -- v n )
pub fn len(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let n = match stack.peek()? {
        Value::Vector(items) => items.len(),
        Value::CharVector(text) => text.chars().count(),
        other => return Err(RuntimeError::type_mismatch("len", VECTOR, other.kind())),
    };
    stack.push(Value::Number(n as i64));
    Ok(())
}
