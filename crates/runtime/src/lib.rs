//! Blacklight Runtime: evaluation engine for a concurrent stack language
//!
//! Key design principles:
//! - Operations are dispatched by name through two tables: primitives act on
//!   the current Stack, meta operations act on the MetaStack
//! - Every `bkg`, `work`, `co` and I/O pump is a May coroutine; tasks talk
//!   through bounded Queues and join at `wait`
//! - Errors are values (`RuntimeError`); a failing task never takes down its
//!   siblings, and root errors go back to the host
//!
//! Hosts feed the runtime ready-made `Operation` sequences and a `Loader`
//! for named program units:
//!
//! ```no_run
//! use blacklight_runtime::{Operation, Runtime, Value, dispatch};
//!
//! let rt = Runtime::default();
//! let ops = vec![
//!     Operation::Push(Value::Number(2)),
//!     Operation::Push(Value::Number(3)),
//!     dispatch::operation("add"),
//! ];
//! let meta = rt.run(&ops).unwrap();
//! assert_eq!(meta.current().unwrap().pop().unwrap(), Value::Number(5));
//! rt.wait_all();
//! ```

pub mod arithmetic;
pub mod concurrency;
pub mod config;
pub mod control;
pub mod descriptors;
pub mod dispatch;
pub mod io;
pub mod loader;
pub mod logging;
pub mod logic;
pub mod meta_ops;
pub mod object_ops;
pub mod pump;
pub mod queue_ops;
pub mod runtime;
pub mod scheduler;
pub mod stack_ops;
pub mod vector_ops;

// Core data model, re-exported so hosts need only this crate
pub use blacklight_core::{
    Block, Char, Direction, IoHandle, MetaStack, Object, Operation, Queue, Result, RuntimeError,
    Stack, Tag, Value, Word,
};

pub use config::RuntimeConfig;
pub use dispatch::{MetaFn, PrimitiveFn};
pub use loader::{Loader, MemoryLoader, NoLoader};
pub use runtime::{MAIN_STACK, Runtime};
pub use scheduler::{FailureCause, TaskFailure, TaskHandle, TaskStats, TaskTracker};
