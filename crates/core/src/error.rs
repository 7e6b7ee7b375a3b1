//! Runtime error taxonomy
//!
//! Every operation returns `Result<T, RuntimeError>`. Only
//! `UnimplementedOperation` is recovered locally (the evaluator logs it and
//! moves on); everything else aborts the task that raised it.

use thiserror::Error;

/// Errors raised while evaluating operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Popping, peeking or rotating below the required depth
    #[error("stack underflow: needs {needed} item(s), has {depth}")]
    StackUnderflow { needed: usize, depth: usize },

    /// An operation received a value of the wrong variant
    #[error("{op}: expected {expected}, got {found}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Object lookup exhausted the delegation chain
    #[error("slot not found: {0}")]
    SlotNotFound(String),

    /// Vector access outside the sequence bounds
    #[error("{op}: index {index} out of range for length {len}")]
    IndexOutOfRange {
        op: &'static str,
        index: i64,
        len: usize,
    },

    #[error("{op}: division by zero")]
    DivisionByZero { op: &'static str },

    #[error("{op}: {code} is not a valid character code")]
    InvalidCodepoint { op: &'static str, code: i64 },

    /// Open/read/write failure on a file resource
    #[error("i/o error on {target}: {message}")]
    Io { target: String, message: String },

    /// The loader could not produce a program unit
    #[error("cannot load {name}: {reason}")]
    Load { name: String, reason: String },

    /// Unrecognized operation name (recoverable)
    #[error("unimplemented operation: {0}")]
    UnimplementedOperation(String),
}

impl RuntimeError {
    pub fn type_mismatch(op: &'static str, expected: &'static str, found: &'static str) -> Self {
        RuntimeError::TypeMismatch {
            op,
            expected,
            found,
        }
    }

    pub fn io(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        RuntimeError::Io {
            target: target.into(),
            message: err.to_string(),
        }
    }

    /// True for the one condition the evaluator recovers from
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RuntimeError::UnimplementedOperation(_))
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
