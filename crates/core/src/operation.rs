//! Operations: the unit the evaluator folds over
//!
//! A lexer (outside this crate) turns source text into a sequence of
//! `Operation`s. The core never looks at text; it only sees literal pushes,
//! quoted blocks and named operations that the runtime dispatches.

use crate::value::{Value, Word};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Push a literal value onto the current Stack
    Push(Value),
    /// Push a quoted block (WordVector) onto the current Stack
    Quote(Block),
    /// Data-level operation evaluated against the current Stack
    Primitive(Word),
    /// Context-level operation evaluated against the MetaStack
    Meta(Word),
}

impl Operation {
    /// Name of the operation as it would be spelled in source
    pub fn name(&self) -> String {
        match self {
            Operation::Push(v) => v.to_string(),
            Operation::Quote(b) => b.to_string(),
            Operation::Primitive(w) | Operation::Meta(w) => w.to_string(),
        }
    }
}

impl From<Value> for Operation {
    fn from(v: Value) -> Self {
        Operation::Push(v)
    }
}

/// A quoted, unevaluated sequence of operations plus the words naming them.
#[derive(Debug, Clone)]
pub struct Block {
    ops: Arc<[Operation]>,
    words: Arc<[Word]>,
}

impl Block {
    pub fn new(ops: Vec<Operation>) -> Self {
        let words = ops.iter().map(|op| Word::new(op.name())).collect();
        Block {
            ops: Arc::from(ops),
            words,
        }
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops) || self.ops == other.ops
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", w)?;
        }
        f.write_str("]")
    }
}
