//! Shared helpers: build operation sequences from whitespace-separated words
//!
//! - `42`, `-7` push Numbers
//! - `"text"` pushes a CharVector (no spaces inside)
//! - `'c'` pushes a Char
//! - `:name` pushes a Word
//! - `[ ... ]` quotes a block (nesting allowed)
//! - anything else is an operation name

#![allow(dead_code)]

use blacklight_runtime::{Block, Char, Operation, Runtime, Value, dispatch};
use std::str::SplitWhitespace;

fn parse(words: &mut SplitWhitespace<'_>, nested: bool) -> Vec<Operation> {
    let mut ops = Vec::new();
    while let Some(word) = words.next() {
        let op = match word {
            "[" => Operation::Quote(Block::new(parse(words, true))),
            "]" if nested => return ops,
            "]" => panic!("unbalanced ]"),
            w if w.parse::<i64>().is_ok() => Operation::Push(Value::Number(w.parse().unwrap())),
            w if w.len() >= 2 && w.starts_with('"') && w.ends_with('"') => {
                Operation::Push(Value::text(&w[1..w.len() - 1]))
            }
            w if w.starts_with('\'') && w.ends_with('\'') && w.chars().count() == 3 => {
                Operation::Push(Value::Char(Char(w.chars().nth(1).unwrap())))
            }
            w if w.len() > 1 && w.starts_with(':') => Operation::Push(Value::word(&w[1..])),
            w => dispatch::operation(w),
        };
        ops.push(op);
    }
    assert!(!nested, "unbalanced [");
    ops
}

pub fn ops(src: &str) -> Vec<Operation> {
    parse(&mut src.split_whitespace(), false)
}

/// Run `src` in a fresh root context and return the current Stack, bottom first
pub fn run(rt: &Runtime, src: &str) -> Vec<Value> {
    let meta = rt.run(&ops(src)).expect("program failed");
    meta.current().unwrap().snapshot()
}

pub fn numbers(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&n| Value::Number(n)).collect()
}

/// Operations for `src`, with each `$NAME` placeholder replaced by a push of
/// the matching text (paths may contain characters the word splitter can't)
pub fn ops_with(src: &str, vars: &[(&str, &str)]) -> Vec<Operation> {
    ops(src)
        .into_iter()
        .map(|op| match op {
            Operation::Primitive(w) => match vars.iter().find(|(name, _)| *name == w.as_str()) {
                Some((_, text)) => Operation::Push(Value::text(text)),
                None => Operation::Primitive(w),
            },
            other => other,
        })
        .collect()
}
