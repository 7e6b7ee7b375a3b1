//! Spawning and joining tasks
//!
//! Every spawned task gets a fresh MetaStack with one Stack, seeded with the
//! values it was handed; after that it shares nothing with its parent except
//! what those values refer to (queues, stacks, objects). Spawning returns
//! immediately. An error inside a task ends only that task and is recorded
//! on the tracker until the host calls `Runtime::wait_all`.

use crate::dispatch;
use crate::runtime::Runtime;
use crate::scheduler::TaskHandle;
use blacklight_core::{MetaStack, Result, Value};

/// Run `body` as a task in a new context whose Stack holds `seed`
/// (first item at the bottom)
fn spawn_context<F>(rt: &Runtime, name: &'static str, seed: Vec<Value>, body: F) -> TaskHandle
where
    F: FnOnce(&MetaStack, &Runtime) -> Result<()> + Send + 'static,
{
    let task_rt = rt.clone();
    rt.tasks().spawn(name, move || {
        let meta = MetaStack::with_root(name);
        let current = meta.current()?;
        for value in seed {
            current.push(value);
        }
        body(&meta, &task_rt)
    })
}

/// `seed [block] bkg`: run the block in the background on `seed`
pub fn bkg(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    let block = current.pop()?.into_block("bkg")?;
    let seed = current.pop()?;
    spawn_context(rt, "bkg", vec![seed], move |meta, rt| {
        dispatch::eval(meta, block.ops(), rt)
    });
    Ok(())
}

/// `out in [block] work`: run the block as a worker over two queues.
/// Worker and caller both end up with `out in` (in on top).
pub fn work(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    let block = current.pop()?.into_block("work")?;
    let input = current.pop()?.into_queue("work")?;
    let output = current.pop()?.into_queue("work")?;
    spawn_context(
        rt,
        "work",
        vec![Value::Queue(output.clone()), Value::Queue(input.clone())],
        move |meta, rt| dispatch::eval(meta, block.ops(), rt),
    );
    current.push(Value::Queue(output));
    current.push(Value::Queue(input));
    Ok(())
}

/// `"unit" co`: run a program unit as a coroutine over two new queues.
/// The coroutine starts with `in out` (out on top); the caller gets
/// `out in` (in on top).
pub fn co(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    let name = current.pop()?.into_text("co")?;
    let input = rt.new_queue();
    let output = rt.new_queue();
    spawn_context(
        rt,
        "co",
        vec![Value::Queue(input.clone()), Value::Queue(output.clone())],
        move |meta, rt| {
            let ops = rt.loader().load(&name)?;
            dispatch::eval(meta, &ops, rt)
        },
    );
    current.push(Value::Queue(output));
    current.push(Value::Queue(input));
    Ok(())
}

/// Block until every other task has finished. Failures stay recorded for
/// the host's `Runtime::wait_all`.
pub fn wait(_meta: &MetaStack, rt: &Runtime) -> Result<()> {
    rt.tasks().join();
    Ok(())
}

/// `q [block] proq`: run the block once per item already in the queue,
/// with the item pushed first. Does not wait for more.
pub fn proq(meta: &MetaStack, rt: &Runtime) -> Result<()> {
    let current = meta.current()?;
    let block = current.pop()?.into_block("proq")?;
    let queue = current.pop()?.into_queue("proq")?;
    while let Some(item) = queue.try_dequeue() {
        meta.current()?.push(item);
        dispatch::eval(meta, block.ops(), rt)?;
    }
    Ok(())
}
