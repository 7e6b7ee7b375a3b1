//! Control flow
//!
//! Blocks (WordVectors) are taken from the current Stack and evaluated
//! against the same MetaStack, so they see and change the caller's
//! context. A condition block must leave a Tag on top of whatever Stack is
//! current when it finishes; any Tag other than nil is true.

use crate::dispatch;
use crate::runtime::Runtime;
use blacklight_core::{Block, MetaStack, Result, Value};
use tracing::debug;

/// Run `cond` and pop the truth value it left
fn test(meta: &MetaStack, cond: &Block, rt: &Runtime, op: &'static str) -> Result<bool> {
    dispatch::eval(meta, cond.ops(), rt)?;
    meta.current()?.pop()?.is_truthy(op)
}

fn pop_block(meta: &MetaStack, op: &'static str) -> Result<Block> {
    meta.current()?.pop()?.into_block(op)
}

/// `[action] [cond] if`
pub fn if_(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let cond = pop_block(meta, "if")?;
    let action = pop_block(meta, "if")?;
    if test(meta, &cond, rt, "if")? {
        dispatch::eval(meta, action.ops(), rt)?;
    }
    Ok(())
}

/// `[iftrue] [iffalse] [cond] either`
pub fn either(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let cond = pop_block(meta, "either")?;
    let iffalse = pop_block(meta, "either")?;
    let iftrue = pop_block(meta, "either")?;
    let branch = if test(meta, &cond, rt, "either")? {
        iftrue
    } else {
        iffalse
    };
    dispatch::eval(meta, branch.ops(), rt)
}

/// `[action] [cond] until`: run the action, then the condition, until the
/// condition is true. The action always runs at least once.
pub fn until(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let cond = pop_block(meta, "until")?;
    let action = pop_block(meta, "until")?;
    loop {
        dispatch::eval(meta, action.ops(), rt)?;
        if test(meta, &cond, rt, "until")? {
            return Ok(());
        }
    }
}

/// `[action] loop`: run forever. Only an error inside the action ends it.
pub fn loop_(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let action = pop_block(meta, "loop")?;
    loop {
        dispatch::eval(meta, action.ops(), rt)?;
    }
}

/// `[block] call`
pub fn call(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let block = pop_block(meta, "call")?;
    dispatch::eval(meta, block.ops(), rt)
}

/// `o :slot get`: fetch a slot from the Object beneath the Word. A block is
/// run with the Object as `self`; anything else is pushed.
pub fn get(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    let slot = current.pop()?.into_word("get")?;
    let object = current.peek()?.into_object("get")?;
    match object.fetch(&slot)? {
        Value::WordVector(method) => {
            meta.push_receiver(object);
            let outcome = dispatch::eval(meta, method.ops(), rt);
            meta.pop_receiver()?;
            outcome
        }
        value => {
            current.push(value);
            Ok(())
        }
    }
}

/// `"name" do`: load a program unit and run it in the current context
pub fn do_(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let name = meta.current()?.pop()?.into_text("do")?;
    let ops = rt.loader().load(&name)?;
    debug!(unit = %name, ops = ops.len(), "do");
    dispatch::eval(meta, &ops, rt)
}
