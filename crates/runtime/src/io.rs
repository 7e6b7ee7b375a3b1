//! I/O operations
//!
//! `read` and `write` bind a descriptor or file to the queue beneath it and
//! start a pump (see `pump`). The queue stays on the Stack with the handle
//! on top of it. `print` is a direct line to stdout for debugging.

use crate::descriptors::STDOUT_LOCK;
use crate::pump;
use crate::runtime::Runtime;
use blacklight_core::{Result, RuntimeError, Stack};
use std::io::{self, Write};
use std::sync::PoisonError;

/// Stream a file or descriptor into the queue
///
/// Stack effect: ( q source -- q handle )
pub fn read(stack: &Stack, rt: &Runtime) -> Result<()> {
    let source = stack.pop()?;
    let queue = stack.peek()?.into_queue("read")?;
    let handle = pump::open_read(rt.tasks(), rt.descriptors(), &source, queue)?;
    stack.push(handle);
    Ok(())
}

/// Stream the queue into a file (created or truncated) or descriptor
///
/// Stack effect: ( q dest -- q handle )
pub fn write(stack: &Stack, rt: &Runtime) -> Result<()> {
    let dest = stack.pop()?;
    let queue = stack.peek()?.into_queue("write")?;
    let handle = pump::open_write(rt.tasks(), rt.descriptors(), &dest, queue)?;
    stack.push(handle);
    Ok(())
}

/// Write a value's display form and a newline to stdout
///
/// Stack effect: ( x -- )
///
/// # Concurrency
/// Takes the coroutine-aware stdout mutex, so lines printed by different
/// tasks never interleave.
pub fn print(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let value = stack.pop()?;
    let _guard = STDOUT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut out = io::stdout().lock();
    writeln!(out, "{}", value)
        .and_then(|_| out.flush())
        .map_err(|e| RuntimeError::io("stdout", e))
}
