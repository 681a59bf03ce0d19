//! Core engine for the Ripple reactive notebook kernel.
//!
//! This crate provides:
//! - Symbol table and dependency graph construction from cell reads/writes
//! - Cycle and reference validation
//! - Topological scheduling for full and incremental runs
//! - The reactive kernel that owns cell state and the execution context
//!
//! # Example
//!
//! ```
//! use ripple_core::{Cell, Kernel, Outputs, Value};
//!
//! let cells = vec![
//!     Cell::input("n", 3),
//!     Cell::new("double", &["n"], &["m"], |inputs| {
//!         let n = inputs.int("n")?;
//!         Ok(Outputs::single("m", n * 2))
//!     }),
//! ];
//!
//! let mut kernel = Kernel::load(cells).unwrap();
//! assert_eq!(*kernel.get_value("m").unwrap(), Value::Int(6));
//!
//! kernel.set_value("n", 5).unwrap();
//! assert_eq!(*kernel.get_value("m").unwrap(), Value::Int(10));
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod graph;
pub mod value;

pub use config::{KernelConfig, ValidationMode};
pub use error::{BoxError, CellFailure, Error, InputError, Result};
pub use execute::{
    CascadeReport, CellStatus, ExecutionCallback, ExecutionContext, Kernel, Subscriber,
    SubscriptionId,
};
pub use graph::{Cell, CellBody, CellId, DependencyGraph, Inputs, Outputs, Scheduler, SymbolTable};
pub use value::Value;
