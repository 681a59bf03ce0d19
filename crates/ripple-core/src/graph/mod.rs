//! Graph engine for dependency resolution.
//!
//! This module provides:
//! - Symbol table mapping each name to its defining cell
//! - Dependency graph construction from declared reads/writes
//! - Cycle and undefined-reference validation
//! - Topological ordering for full and incremental execution

mod builder;
mod schedule;
mod symbols;
mod types;
mod validate;

pub use builder::DependencyGraph;
pub use schedule::Scheduler;
pub use symbols::SymbolTable;
pub use types::{Cell, CellBody, CellId, Inputs, Outputs};
pub use validate::{find_cycle, validate};
