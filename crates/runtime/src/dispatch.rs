//! Operation dispatch
//!
//! Two name-keyed tables drive evaluation:
//!
//! - primitives act on the current Stack (the top of the MetaStack)
//! - meta operations act on the MetaStack itself, and are the only ones
//!   that evaluate nested blocks or spawn tasks
//!
//! An operation whose name is in neither table fails with
//! `UnimplementedOperation`; `eval` logs it and moves on with the stacks
//! untouched. Every other error ends the evaluation.

use crate::runtime::Runtime;
use crate::{
    arithmetic, concurrency, control, io, logic, meta_ops, object_ops, queue_ops, stack_ops,
    vector_ops,
};
use blacklight_core::{MetaStack, Operation, Result, RuntimeError, Stack, Value, Word};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

/// A data-level operation on the current Stack
pub type PrimitiveFn = fn(&Stack, &Runtime) -> Result<()>;

/// A context-level operation on the MetaStack
pub type MetaFn = fn(&MetaStack, &Runtime) -> Result<()>;

const PRIMITIVE_TABLE: &[(&str, PrimitiveFn)] = &[
    // current Stack
    ("decap", stack_ops::decap),
    ("depth", stack_ops::depth),
    ("drop", stack_ops::drop),
    ("dup", stack_ops::dup),
    ("over", stack_ops::over),
    ("purge", stack_ops::purge),
    ("rot", stack_ops::rot),
    ("swap", stack_ops::swap),
    // Stack handles
    ("news", stack_ops::new_stack),
    ("<>", stack_ops::new_stack),
    ("s-new", stack_ops::new_stack),
    ("push", stack_ops::push),
    ("pop", stack_ops::pop),
    ("size", stack_ops::size),
    ("tail", stack_ops::tail),
    // Numbers and Chars
    ("add", arithmetic::add),
    ("sub", arithmetic::sub),
    ("mul", arithmetic::mul),
    ("div", arithmetic::div),
    ("mod", arithmetic::rem),
    ("n-to-c", arithmetic::n_to_c),
    ("n-to-cv", arithmetic::n_to_cv),
    ("c-to-cv", arithmetic::c_to_cv),
    ("c-to-n", arithmetic::c_to_n),
    // Vectors
    ("()", vector_ops::new_vector),
    ("v-new", vector_ops::new_vector),
    ("''", vector_ops::new_char_vector),
    ("cat", vector_ops::cat),
    ("app", vector_ops::app),
    ("ato", vector_ops::ato),
    ("rmo", vector_ops::rmo),
    ("len", vector_ops::len),
    // Queues
    ("newq", queue_ops::newq),
    ("enq", queue_ops::enq),
    ("deq", queue_ops::deq),
    ("q-to-v", queue_ops::q_to_v),
    ("q-to-cv", queue_ops::q_to_cv),
    // Objects
    ("o-new", object_ops::o_new),
    ("set", object_ops::set),
    ("fetch", object_ops::fetch),
    ("child", object_ops::child),
    // Logic
    ("eq", logic::eq),
    ("not", logic::not),
    ("nil", logic::nil),
    ("true", logic::truth),
    // I/O
    ("read", io::read),
    ("write", io::write),
    ("print", io::print),
];

const META_TABLE: &[(&str, MetaFn)] = &[
    // MetaStack
    ("@", meta_ops::push_current),
    ("^", meta_ops::push_previous),
    ("$", meta_ops::push_meta),
    ("$decap", meta_ops::decap),
    ("$drop", meta_ops::drop),
    ("$new", meta_ops::new_frame),
    ("$swap", meta_ops::swap),
    ("self", meta_ops::receiver),
    // control flow
    ("if", control::if_),
    ("either", control::either),
    ("until", control::until),
    ("loop", control::loop_),
    ("call", control::call),
    ("get", control::get),
    ("do", control::do_),
    // tasks
    ("co", concurrency::co),
    ("bkg", concurrency::bkg),
    ("work", concurrency::work),
    ("wait", concurrency::wait),
    ("proq", concurrency::proq),
];

static PRIMITIVES: LazyLock<HashMap<&'static str, PrimitiveFn>> =
    LazyLock::new(|| PRIMITIVE_TABLE.iter().copied().collect());

static META: LazyLock<HashMap<&'static str, MetaFn>> =
    LazyLock::new(|| META_TABLE.iter().copied().collect());

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains_key(name)
}

pub fn is_meta(name: &str) -> bool {
    META.contains_key(name)
}

/// Classify a word as the operation a lexer should emit for it. Unknown
/// names become primitives and fail as unimplemented when evaluated.
pub fn operation(name: &str) -> Operation {
    if is_meta(name) {
        Operation::Meta(Word::new(name))
    } else {
        Operation::Primitive(Word::new(name))
    }
}

/// Every operation name, primitives first, in table order
pub fn vocabulary() -> impl Iterator<Item = &'static str> {
    PRIMITIVE_TABLE
        .iter()
        .map(|(name, _)| *name)
        .chain(META_TABLE.iter().map(|(name, _)| *name))
}

fn step(meta: &MetaStack, op: &Operation, rt: &Runtime) -> Result<()> {
    match op {
        Operation::Push(value) => {
            meta.current()?.push(value.clone());
            Ok(())
        }
        Operation::Quote(block) => {
            meta.current()?.push(Value::WordVector(block.clone()));
            Ok(())
        }
        // A word filed under the wrong table still runs
        Operation::Primitive(word) | Operation::Meta(word) => {
            let name = word.as_str();
            if let Some(f) = PRIMITIVES.get(name) {
                f(&meta.current()?, rt)
            } else if let Some(f) = META.get(name) {
                f(meta, rt)
            } else {
                Err(RuntimeError::UnimplementedOperation(name.to_string()))
            }
        }
    }
}

/// Evaluate `ops` in order against `meta`
pub fn eval(meta: &MetaStack, ops: &[Operation], rt: &Runtime) -> Result<()> {
    for op in ops {
        match step(meta, op, rt) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => warn!("{}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_disjoint() {
        for (name, _) in PRIMITIVE_TABLE {
            assert!(!is_meta(name), "{} is in both tables", name);
        }
        let names: Vec<&str> = vocabulary().collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(operation("add"), Operation::Primitive(Word::new("add")));
        assert_eq!(operation("until"), Operation::Meta(Word::new("until")));
        assert_eq!(operation("frob"), Operation::Primitive(Word::new("frob")));
        assert!(is_primitive("q-to-cv"));
        assert!(is_meta("$new"));
        assert!(!is_primitive("$new"));
    }

    #[test]
    fn test_unknown_operation_is_skipped() {
        let rt = Runtime::default();
        let meta = MetaStack::with_root("test");
        let ops = vec![
            Operation::Push(Value::Number(1)),
            operation("frob"),
            Operation::Push(Value::Number(2)),
        ];
        eval(&meta, &ops, &rt).unwrap();
        assert_eq!(
            meta.current().unwrap().snapshot(),
            vec![Value::Number(1), Value::Number(2)]
        );
    }

    #[test]
    fn test_error_stops_evaluation() {
        let rt = Runtime::default();
        let meta = MetaStack::with_root("test");
        let ops = vec![
            operation("drop"),
            Operation::Push(Value::Number(2)),
        ];
        assert!(matches!(
            eval(&meta, &ops, &rt),
            Err(RuntimeError::StackUnderflow { .. })
        ));
        assert!(meta.current().unwrap().is_empty());
    }

    #[test]
    fn test_empty_metastack_has_no_current_stack() {
        let rt = Runtime::default();
        let meta = MetaStack::new();
        assert!(eval(&meta, &[Operation::Push(Value::Number(1))], &rt).is_err());
    }
}
