//! Cycle and reference validation.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Control, DfsEvent, depth_first_search};

use crate::config::ValidationMode;
use crate::error::{Error, Result};

use super::builder::DependencyGraph;
use super::types::CellId;

/// Validate a freshly built graph.
///
/// `issues` are the problems the builder already found. In aggregate mode the
/// cycle check still runs over whatever edges did resolve and every problem
/// is reported at once; in fail-fast mode the first problem is returned.
pub fn validate(graph: &DependencyGraph, issues: Vec<Error>, mode: ValidationMode) -> Result<()> {
    let mut issues = issues;

    if mode == ValidationMode::FailFast {
        if let Some(first) = issues.into_iter().next() {
            return Err(first);
        }
        issues = Vec::new();
    }

    if let Some(cycle) = find_cycle(graph.inner()) {
        issues.push(Error::CyclicDependency { cycle });
    }

    match Error::from_issues(issues) {
        Some(err) => {
            tracing::debug!(problems = err.issues().len(), "graph validation failed");
            Err(err)
        }
        None => Ok(()),
    }
}

/// Find a cycle with a depth-first search.
///
/// Returns the cells on the first back-edge's cycle, starting at the edge's
/// target and following edge direction. Starts are visited in declaration
/// order, so the result is deterministic.
pub fn find_cycle(graph: &DiGraph<CellId, ()>) -> Option<Vec<CellId>> {
    let mut parent: Vec<Option<NodeIndex>> = vec![None; graph.node_count()];

    let back_edge = depth_first_search(graph, graph.node_indices(), |event| match event {
        DfsEvent::TreeEdge(u, v) => {
            parent[v.index()] = Some(u);
            Control::Continue
        }
        DfsEvent::BackEdge(u, v) => Control::Break((u, v)),
        _ => Control::Continue,
    })
    .break_value()?;

    // Walk tree edges back from the edge's source to its target
    let (tail, head) = back_edge;
    let mut path = vec![tail];
    let mut current = tail;
    while current != head {
        current = parent[current.index()]?;
        path.push(current);
    }
    path.reverse();

    Some(path.into_iter().map(|idx| graph[idx]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Cell, Outputs};

    fn make_cell(reads: &[&str], writes: &[&str]) -> Cell {
        Cell::new("test", reads, writes, |_| Ok(Outputs::new()))
    }

    fn check(cells: &[Cell], mode: ValidationMode) -> Result<()> {
        let (graph, issues) = DependencyGraph::build(cells, mode);
        validate(&graph, issues, mode)
    }

    fn ids(raw: &[usize]) -> Vec<CellId> {
        raw.iter().copied().map(CellId::new).collect()
    }

    #[test]
    fn test_acyclic_passes() {
        let cells = [
            make_cell(&[], &["a"]),
            make_cell(&["a"], &["b"]),
            make_cell(&["a", "b"], &["c"]),
        ];
        assert!(check(&cells, ValidationMode::Aggregate).is_ok());
    }

    #[test]
    fn test_cycle_detection() {
        let cells = [
            make_cell(&["c"], &["a"]),
            make_cell(&["a"], &["b"]),
            make_cell(&["b"], &["c"]),
        ];
        let err = check(&cells, ValidationMode::Aggregate).unwrap_err();
        match err {
            Error::CyclicDependency { cycle } => assert_eq!(cycle, ids(&[0, 1, 2])),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let cells = [make_cell(&["x"], &["x"])];
        let err = check(&cells, ValidationMode::Aggregate).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { ref cycle } if *cycle == ids(&[0])));
    }

    #[test]
    fn test_cycle_only_includes_loop_members() {
        // 0 → 1 → 2 → 1, plus an unrelated 3
        let cells = [
            make_cell(&[], &["a"]),
            make_cell(&["a", "c"], &["b"]),
            make_cell(&["b"], &["c"]),
            make_cell(&[], &["d"]),
        ];
        let err = check(&cells, ValidationMode::Aggregate).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { ref cycle } if *cycle == ids(&[1, 2])));
    }

    #[test]
    fn test_aggregate_reports_everything() {
        let cells = [
            make_cell(&["nope"], &["a"]),
            make_cell(&["b"], &["b"]),
            make_cell(&["also_nope"], &["c"]),
        ];
        let err = check(&cells, ValidationMode::Aggregate).unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 3);
        assert!(matches!(issues[0], Error::UndefinedName { .. }));
        assert!(matches!(issues[1], Error::UndefinedName { .. }));
        assert!(matches!(issues[2], Error::CyclicDependency { .. }));
    }

    #[test]
    fn test_fail_fast_reports_first() {
        let cells = [
            make_cell(&["nope"], &["a"]),
            make_cell(&["b"], &["b"]),
        ];
        let err = check(&cells, ValidationMode::FailFast).unwrap_err();
        assert!(matches!(err, Error::UndefinedName { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_fail_fast_still_finds_cycles() {
        let cells = [make_cell(&["b"], &["a"]), make_cell(&["a"], &["b"])];
        let err = check(&cells, ValidationMode::FailFast).unwrap_err();
        assert!(matches!(err, Error::CyclicDependency { .. }));
    }
}
