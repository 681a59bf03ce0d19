//! Execution engine for Ripple notebooks.
//!
//! # Architecture
//!
//! ```text
//! Vec<Cell>
//!     │
//!     └── DependencyGraph::build ── validate ── Scheduler
//!             │
//!             └── Kernel
//!                     │
//!                     ├── run_all / set_value / run_cell / run_stale
//!                     │       └── cascade: cells in topological order
//!                     │               └── CellBody::run(Inputs) → Outputs
//!                     │                       └── committed to ExecutionContext
//!                     │
//!                     └── Subscriptions notified once per changed name
//! ```
//!
//! # Module Structure
//!
//! - `context` - Execution context and progress callbacks
//! - `kernel` - The reactive kernel
//! - `subscribe` - Change subscriptions

mod context;
mod kernel;
mod subscribe;

pub use context::{ExecutionCallback, ExecutionContext};
pub use kernel::{CascadeReport, CellStatus, Kernel};
pub use subscribe::{Subscriber, SubscriptionId};
