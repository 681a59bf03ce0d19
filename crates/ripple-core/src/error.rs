//! Error types for ripple-core.

use thiserror::Error;

use crate::graph::CellId;

/// Result type for ripple-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by cell bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur in ripple-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Two cells write the same name.
    #[error("name `{name}` is defined by both {first} and {second}")]
    DuplicateDefinition {
        name: String,
        first: CellId,
        second: CellId,
    },

    /// A name is read (or looked up) but no cell defines it.
    #[error("undefined name `{name}`{}", .reader.map(|id| format!(" (read by {})", id)).unwrap_or_default())]
    UndefinedName {
        name: String,
        reader: Option<CellId>,
    },

    /// Cyclic dependency detected in the cell graph.
    #[error("cyclic dependency detected: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<CellId> },

    /// A cell declares no outputs.
    #[error("{cell} declares no outputs")]
    NoOutputs { cell: CellId },

    /// Several build problems reported together.
    #[error("{} problems found in notebook:\n{}", .0.len(), format_all(.0))]
    Multiple(Vec<Error>),

    /// A cell body failed while running a load or cascade.
    #[error("{cell} failed: {cause}")]
    CellExecution {
        cell: CellId,
        cause: CellFailure,
        /// Cells that finished with new values before the failure.
        updated: Vec<CellId>,
        /// Cells that were scheduled after the failing cell and never ran.
        skipped: Vec<CellId>,
    },

    /// The name is defined but its cell has not produced it yet.
    #[error("no value for `{name}` (its cell has not run successfully)")]
    MissingValue { name: String },

    /// Cell not found.
    #[error("cell not found: {0}")]
    CellNotFound(CellId),
}

impl Error {
    /// Iterate over individual problems, flattening [`Error::Multiple`].
    pub fn issues(&self) -> Vec<&Error> {
        match self {
            Error::Multiple(errors) => errors.iter().flat_map(Error::issues).collect(),
            other => vec![other],
        }
    }

    /// Whether this error comes from graph construction rather than execution.
    pub fn is_build_error(&self) -> bool {
        match self {
            Error::DuplicateDefinition { .. }
            | Error::CyclicDependency { .. }
            | Error::NoOutputs { .. } => true,
            Error::UndefinedName { reader, .. } => reader.is_some(),
            Error::Multiple(errors) => errors.iter().all(Error::is_build_error),
            _ => false,
        }
    }

    /// Collapse a list of build problems into one error.
    pub(crate) fn from_issues(mut issues: Vec<Error>) -> Option<Error> {
        match issues.len() {
            0 => None,
            1 => issues.pop(),
            _ => Some(Error::Multiple(issues)),
        }
    }
}

/// Why a single cell execution failed.
#[derive(Debug, Error)]
pub enum CellFailure {
    /// The body returned an error.
    #[error("{0}")]
    Body(BoxError),

    /// The body panicked.
    #[error("panicked: {0}")]
    Panic(String),

    /// An input the cell reads has no value in the context.
    #[error("input `{0}` has no value")]
    MissingInput(String),

    /// The body did not return a declared output.
    #[error("declared output `{0}` was not returned")]
    MissingOutput(String),

    /// The body returned a name it does not declare.
    #[error("returned undeclared output `{0}`")]
    UndeclaredOutput(String),
}

/// Error returned by the typed accessors on [`Inputs`](crate::graph::Inputs).
#[derive(Debug, Error)]
pub enum InputError {
    /// The cell did not declare or receive this input.
    #[error("input `{0}` is not available")]
    Missing(String),

    /// The input holds a different kind of value.
    #[error("input `{name}` is {found}, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

fn format_cycle(cycle: &[CellId]) -> String {
    let mut names: Vec<String> = cycle.iter().map(ToString::to_string).collect();
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names.join(" → ")
}

fn format_all(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
