//! Queue operations
//!
//! `enq` and `deq` block (suspending the task) when the queue is full or
//! empty, and leave the queue on the Stack so they can be chained.
//! `q-to-v` takes only what is already there; `q-to-cv` keeps reading until
//! it sees end of stream.

use crate::runtime::Runtime;
use blacklight_core::{Result, Stack, Value};

/// Stack effect: ( -- q )
pub fn newq(stack: &Stack, rt: &Runtime) -> Result<()> {
    stack.push(Value::Queue(rt.new_queue()));
    Ok(())
}

/// Stack effect: ( q x -- q )
pub fn enq(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let item = stack.pop()?;
    let queue = stack.peek()?.into_queue("enq")?;
    queue.enqueue(item);
    Ok(())
}

/// Stack effect: ( q -- q x )
pub fn deq(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let queue = stack.peek()?.into_queue("deq")?;
    stack.push(queue.dequeue());
    Ok(())
}

/// Everything currently queued, without waiting for more
///
/// Stack effect: ( q -- v )
pub fn q_to_v(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let queue = stack.pop()?.into_queue("q-to-v")?;
    stack.push(Value::vector(queue.drain()));
    Ok(())
}

/// Collect Chars up to the nil end-of-stream marker (consumed, not kept)
///
/// Stack effect: ( q -- cv )
pub fn q_to_cv(stack: &Stack, _rt: &Runtime) -> Result<()> {
    let queue = stack.pop()?.into_queue("q-to-cv")?;
    let mut text = String::new();
    loop {
        let item = queue.dequeue();
        if item.is_nil() {
            break;
        }
        text.push(item.into_char("q-to-cv")?.0);
    }
    stack.push(Value::text(text));
    Ok(())
}
