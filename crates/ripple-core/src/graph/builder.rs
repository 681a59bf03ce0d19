//! Dependency graph construction.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashSet;

use crate::config::ValidationMode;
use crate::error::Error;

use super::symbols::SymbolTable;
use super::types::{Cell, CellId};

/// The dependency graph of a notebook.
///
/// Node `i` is the cell declared at position `i`. An edge goes from the cell
/// that writes a name to every cell that reads it.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The directed graph: edges go from producer to consumer
    graph: DiGraph<CellId, ()>,
    /// Output name to producing cell mapping
    symbols: SymbolTable,
}

impl DependencyGraph {
    /// Build the graph for `cells`.
    ///
    /// Problems found along the way (`NoOutputs`, `DuplicateDefinition`,
    /// `UndefinedName`) are returned next to the graph rather than aborting,
    /// so the validator can report them together. With
    /// [`ValidationMode::FailFast`] building stops at the first problem and
    /// the returned graph is incomplete.
    pub fn build(cells: &[Cell], mode: ValidationMode) -> (Self, Vec<Error>) {
        let mut graph = DiGraph::with_capacity(cells.len(), cells.len());
        let mut symbols = SymbolTable::new();
        let mut issues = Vec::new();

        let stop = |issues: &Vec<Error>| mode == ValidationMode::FailFast && !issues.is_empty();

        // First pass: one node per cell, register outputs
        for (idx, cell) in cells.iter().enumerate() {
            let id = CellId::new(idx);
            graph.add_node(id);

            if cell.writes().is_empty() {
                issues.push(Error::NoOutputs { cell: id });
            }
            if let Err(err) = symbols.register(id, cell) {
                push_issue(&mut issues, err, mode);
            }
            if stop(&issues) {
                return (Self { graph, symbols }, issues);
            }
        }

        // Second pass: resolve reads into edges
        let mut seen = FxHashSet::default();
        for (idx, cell) in cells.iter().enumerate() {
            let reader = CellId::new(idx);
            for name in cell.reads() {
                match symbols.get(name) {
                    Some(producer) => {
                        if seen.insert((producer, reader)) {
                            graph.add_edge(node(producer), node(reader), ());
                        }
                    }
                    None => issues.push(Error::UndefinedName {
                        name: name.clone(),
                        reader: Some(reader),
                    }),
                }
                if stop(&issues) {
                    return (Self { graph, symbols }, issues);
                }
            }
        }

        tracing::debug!(
            cells = cells.len(),
            edges = graph.edge_count(),
            problems = issues.len(),
            "built dependency graph"
        );

        (Self { graph, symbols }, issues)
    }

    /// Get the symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Get direct dependencies of a cell (cells it reads from), sorted.
    pub fn dependencies(&self, id: CellId) -> Vec<CellId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Get direct dependents of a cell (cells that read from it), sorted.
    pub fn dependents(&self, id: CellId) -> Vec<CellId> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: CellId, direction: Direction) -> Vec<CellId> {
        if id.0 >= self.graph.node_count() {
            return Vec::new();
        }
        let mut ids: Vec<CellId> = self
            .graph
            .neighbors_directed(node(id), direction)
            .map(|idx| self.graph[idx])
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Whether there is an edge `from → to`.
    pub fn has_edge(&self, from: CellId, to: CellId) -> bool {
        from.0 < self.graph.node_count()
            && to.0 < self.graph.node_count()
            && self.graph.contains_edge(node(from), node(to))
    }

    /// Get the number of cells.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn inner(&self) -> &DiGraph<CellId, ()> {
        &self.graph
    }
}

pub(crate) fn node(id: CellId) -> NodeIndex {
    NodeIndex::new(id.0)
}

fn push_issue(issues: &mut Vec<Error>, err: Error, mode: ValidationMode) {
    match err {
        Error::Multiple(inner) if mode == ValidationMode::FailFast => {
            issues.extend(inner.into_iter().take(1));
        }
        Error::Multiple(inner) => issues.extend(inner),
        other => issues.push(other),
    }
}
