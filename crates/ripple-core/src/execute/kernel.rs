//! The reactive kernel.
//!
//! Owns the cells, their status, and the execution context. Every mutating
//! method takes `&mut self` and runs its cascade to completion before
//! returning, so two cascades never interleave.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::KernelConfig;
use crate::error::{CellFailure, Error, Result};
use crate::graph::{Cell, CellId, DependencyGraph, Inputs, Scheduler, validate};
use crate::value::Value;

use super::context::{ExecutionCallback, ExecutionContext};
use super::subscribe::{Subscriber, SubscriptionId, Subscriptions};

/// Execution status of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Outputs are stale (or were never computed) and must be re-run.
    Dirty,
    /// Outputs are up to date with the cell's inputs.
    Clean,
    /// The last execution failed; outputs keep their last good values.
    Error,
}

/// Summary of a completed cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Cells executed, in order
    pub executed: Vec<CellId>,
    /// Names whose value changed, in the order they were written
    pub changed: Vec<String>,
}

/// The reactive notebook kernel.
pub struct Kernel {
    /// Cells by id
    cells: Vec<Cell>,
    /// Validated dependency graph
    graph: DependencyGraph,
    /// Execution orders
    scheduler: Scheduler,
    /// Status per cell, indexed by id
    statuses: Vec<CellStatus>,
    /// Live values
    context: ExecutionContext,
    /// Presentation-layer subscribers
    subscriptions: Subscriptions,
    /// Execution callback for progress reporting
    callback: Option<Box<dyn ExecutionCallback>>,
    config: KernelConfig,
}

impl Kernel {
    /// Build and validate a kernel without running any cell.
    ///
    /// Every cell starts [`CellStatus::Dirty`] and the context is empty.
    pub fn new(cells: Vec<Cell>) -> Result<Self> {
        Self::with_config(cells, KernelConfig::default())
    }

    /// Build and validate a kernel with the given configuration.
    pub fn with_config(cells: Vec<Cell>, config: KernelConfig) -> Result<Self> {
        let (graph, issues) = DependencyGraph::build(&cells, config.validation);
        validate(&graph, issues, config.validation)?;
        let scheduler = Scheduler::new(&graph)?;

        tracing::info!(
            cells = cells.len(),
            edges = graph.edge_count(),
            names = graph.symbols().len(),
            "notebook graph ready"
        );

        Ok(Self {
            statuses: vec![CellStatus::Dirty; cells.len()],
            cells,
            graph,
            scheduler,
            context: ExecutionContext::new(),
            subscriptions: Subscriptions::default(),
            callback: None,
            config,
        })
    }

    /// Build, validate, and run every cell once.
    pub fn load(cells: Vec<Cell>) -> Result<Self> {
        Self::load_with_config(cells, KernelConfig::default())
    }

    /// [`Kernel::load`] with the given configuration.
    pub fn load_with_config(cells: Vec<Cell>, config: KernelConfig) -> Result<Self> {
        let mut kernel = Self::with_config(cells, config)?;
        kernel.run_all()?;
        Ok(kernel)
    }

    /// Set the execution callback for progress reporting.
    pub fn set_callback(&mut self, callback: impl ExecutionCallback + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Execute every cell in topological order.
    pub fn run_all(&mut self) -> Result<CascadeReport> {
        let order = self.scheduler.full_order().to_vec();
        tracing::info!(cells = order.len(), "running all cells");
        self.run_cascade(order, Vec::new())
    }

    /// Assign `value` to `name` and re-run everything downstream of its cell.
    ///
    /// The defining cell's body is not run; the value goes straight into the
    /// context. If a downstream cell fails the cascade stops there: cells
    /// already run keep their new values, the rest keep their old ones, and
    /// the error lists both.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<CascadeReport> {
        let owner = self.graph.symbols().resolve(name)?;
        let value = value.into();
        tracing::debug!(name, cell = %owner, %value, "set value");

        let mut changed = Vec::new();
        if self.context.insert(name, value) {
            changed.push(name.to_string());
        }

        let cell = &self.cells[owner.0];
        if cell.writes().iter().all(|w| self.context.contains(w)) {
            self.statuses[owner.0] = CellStatus::Clean;
        }

        let order = self.scheduler.affected_order(&[owner]);
        self.run_cascade(order, changed)
    }

    /// Re-run one cell and everything downstream of it.
    pub fn run_cell(&mut self, id: CellId) -> Result<CascadeReport> {
        if id.0 >= self.cells.len() {
            return Err(Error::CellNotFound(id));
        }
        let order = self.scheduler.closure_order(&[id]);
        self.run_cascade(order, Vec::new())
    }

    /// Re-run every cell that is dirty or failed, plus everything downstream.
    pub fn run_stale(&mut self) -> Result<CascadeReport> {
        let stale = self.stale_cells();
        if stale.is_empty() {
            return Ok(CascadeReport::default());
        }
        let order = self.scheduler.closure_order(&stale);
        self.run_cascade(order, Vec::new())
    }

    /// Get the current value of `name`.
    pub fn get_value(&self, name: &str) -> Result<Arc<Value>> {
        self.graph.symbols().resolve(name)?;
        self.context.get(name).ok_or_else(|| Error::MissingValue {
            name: name.to_string(),
        })
    }

    /// Call `subscriber` after every cascade that changes `name`.
    pub fn subscribe(
        &mut self,
        name: &str,
        subscriber: impl Subscriber + 'static,
    ) -> Result<SubscriptionId> {
        self.graph.symbols().resolve(name)?;
        Ok(self.subscriptions.subscribe(name, Box::new(subscriber)))
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Get the execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Get the status of a cell.
    pub fn status(&self, id: CellId) -> Option<CellStatus> {
        self.statuses.get(id.0).copied()
    }

    /// Cells that are not clean, in topological order.
    pub fn stale_cells(&self) -> Vec<CellId> {
        self.scheduler
            .full_order()
            .iter()
            .copied()
            .filter(|id| self.statuses[id.0] != CellStatus::Clean)
            .collect()
    }

    /// Get a cell by ID.
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    /// Get the cell that defines `name`.
    pub fn cell_defining(&self, name: &str) -> Option<CellId> {
        self.graph.symbols().get(name)
    }

    /// Get a cell's id by its display name (first match in declaration order).
    pub fn cell_by_name(&self, name: &str) -> Option<CellId> {
        self.cells
            .iter()
            .position(|cell| cell.name() == name)
            .map(CellId::new)
    }

    /// Iterate over all cells with their ids, in declaration order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (CellId::new(idx), cell))
    }

    /// Get cells in topological order.
    pub fn full_order(&self) -> &[CellId] {
        self.scheduler.full_order()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Execute `order`, then notify subscribers of everything that changed.
    ///
    /// `changed` holds names already changed before the cascade started.
    fn run_cascade(
        &mut self,
        order: Vec<CellId>,
        mut changed: Vec<String>,
    ) -> Result<CascadeReport> {
        for id in &order {
            self.statuses[id.0] = CellStatus::Dirty;
        }
        if let Some(ref callback) = self.callback {
            callback.on_cascade_started(order.len());
        }

        let mut executed = Vec::with_capacity(order.len());
        let mut failure = None;

        for (pos, &id) in order.iter().enumerate() {
            match self.execute_cell(id) {
                Ok(written) => {
                    executed.push(id);
                    changed.extend(written);
                }
                Err(cause) => {
                    failure = Some((pos, id, cause));
                    break;
                }
            }
        }

        if let Some(ref callback) = self.callback {
            callback.on_cascade_completed(executed.len());
        }

        // Notify after the cascade, including a halted one
        let delivered = self.subscriptions.notify(&changed, &self.context);

        match failure {
            Some((pos, cell, cause)) => {
                let skipped = order[pos + 1..].to_vec();
                tracing::warn!(
                    cell = %cell,
                    name = self.cells[cell.0].name(),
                    updated = executed.len(),
                    skipped = skipped.len(),
                    "cascade halted: {}",
                    cause
                );
                Err(Error::CellExecution {
                    cell,
                    cause,
                    updated: executed,
                    skipped,
                })
            }
            None => {
                tracing::debug!(
                    executed = executed.len(),
                    changed = changed.len(),
                    notified = delivered,
                    "cascade complete"
                );
                Ok(CascadeReport { executed, changed })
            }
        }
    }

    /// Execute a single cell and commit its outputs.
    ///
    /// Returns the names whose value changed.
    fn execute_cell(&mut self, id: CellId) -> std::result::Result<Vec<String>, CellFailure> {
        let cell = &self.cells[id.0];

        if let Some(ref callback) = self.callback {
            callback.on_cell_started(id, cell.name());
        }

        let result = invoke(cell, &self.context, self.config.catch_panics);

        match result {
            Ok(values) => {
                let mut written = Vec::new();
                for (name, value) in values {
                    if self.context.insert(&name, value) {
                        written.push(name);
                    }
                }
                self.statuses[id.0] = CellStatus::Clean;
                tracing::debug!(cell = %id, name = cell.name(), changed = written.len(), "cell executed");
                if let Some(ref callback) = self.callback {
                    callback.on_cell_completed(id, cell.name());
                }
                Ok(written)
            }
            Err(failure) => {
                self.statuses[id.0] = CellStatus::Error;
                if let Some(ref callback) = self.callback {
                    callback.on_cell_error(id, cell.name(), &failure);
                }
                Err(failure)
            }
        }
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("cells", &self.cells.len())
            .field("statuses", &self.statuses)
            .field("values", &self.context.len())
            .field("subscriptions", &self.subscriptions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run a cell body against the context without committing anything.
///
/// Returns the outputs in the cell's write order, after checking they match
/// the declared writes exactly.
fn invoke(
    cell: &Cell,
    context: &ExecutionContext,
    catch_panics: bool,
) -> std::result::Result<Vec<(String, Value)>, CellFailure> {
    let mut values = Vec::with_capacity(cell.reads().len());
    for name in cell.reads() {
        let value = context
            .get(name)
            .ok_or_else(|| CellFailure::MissingInput(name.clone()))?;
        values.push((name.clone(), value));
    }
    let inputs = Inputs::new(values);

    let outcome = if catch_panics {
        panic::catch_unwind(AssertUnwindSafe(|| cell.body().run(&inputs)))
            .map_err(|payload| CellFailure::Panic(panic_message(payload.as_ref())))?
    } else {
        cell.body().run(&inputs)
    };
    let mut outputs = outcome.map_err(CellFailure::Body)?;

    if let Some(extra) = outputs.names().find(|n| !cell.writes().iter().any(|w| w == n)) {
        return Err(CellFailure::UndeclaredOutput(extra.to_string()));
    }

    cell.writes()
        .iter()
        .map(|name| {
            outputs
                .take(name)
                .map(|value| (name.clone(), value))
                .ok_or_else(|| CellFailure::MissingOutput(name.clone()))
        })
        .collect()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
