//! Blacklight Core: the data model of a concatenative language runtime
//!
//! This crate holds the pieces every other layer depends on and that carry
//! no evaluation logic of their own:
//!
//! - `value`: the closed `Value` sum type plus `Char`, `Word`, `Tag`, `IoHandle`
//! - `operation`: `Operation` and quoted `Block`s (WordVectors)
//! - `queue`: bounded MPMC queue with cooperative blocking
//! - `object`: prototype objects with parent delegation
//! - `stack`: `Stack` and `MetaStack` (the stack of stacks)
//! - `error`: `RuntimeError` taxonomy

pub mod error;
pub mod object;
pub mod operation;
pub mod queue;
pub mod stack;
pub mod value;

pub use error::{Result, RuntimeError};
pub use object::Object;
pub use operation::{Block, Operation};
pub use queue::{DEFAULT_QUEUE_CAPACITY, Queue};
pub use stack::{MetaStack, SYSTEM_STACK, Stack};
pub use value::{Char, Direction, IoHandle, IoHandleData, NIL, TRUE, Tag, Value, Word};
