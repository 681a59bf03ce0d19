//! Topological scheduling for full and incremental runs.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::error::{Error, Result};

use super::builder::DependencyGraph;
use super::types::CellId;
use super::validate::find_cycle;

/// Execution orders for a validated dependency graph.
///
/// The full order is computed once; incremental orders are derived from it
/// by filtering, so every order the scheduler hands out agrees with it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// All cells in topological order
    order: Vec<CellId>,
    /// Position of each cell in `order`
    rank: Vec<usize>,
    /// Forward adjacency: producer → consumers
    dependents: Vec<Vec<CellId>>,
    /// Reverse adjacency: consumer → producers
    dependencies: Vec<Vec<CellId>>,
}

impl Scheduler {
    /// Compute the full order with Kahn's algorithm.
    ///
    /// Among cells that are ready at the same time, the one declared first
    /// runs first.
    pub fn new(graph: &DependencyGraph) -> Result<Self> {
        let n = graph.len();
        let dependents: Vec<Vec<CellId>> =
            (0..n).map(|i| graph.dependents(CellId::new(i))).collect();
        let dependencies: Vec<Vec<CellId>> =
            (0..n).map(|i| graph.dependencies(CellId::new(i))).collect();

        let mut in_degree: Vec<usize> = dependencies.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse(idx)) = ready.pop() {
            order.push(CellId::new(idx));
            for dep in &dependents[idx] {
                in_degree[dep.0] -= 1;
                if in_degree[dep.0] == 0 {
                    ready.push(Reverse(dep.0));
                }
            }
        }

        if order.len() != n {
            let cycle = find_cycle(graph.inner()).unwrap_or_default();
            return Err(Error::CyclicDependency { cycle });
        }

        let mut rank = vec![0; n];
        for (pos, id) in order.iter().enumerate() {
            rank[id.0] = pos;
        }

        tracing::debug!(cells = n, "computed execution order");

        Ok(Self {
            order,
            rank,
            dependents,
            dependencies,
        })
    }

    /// Get cells in topological order (respecting dependencies).
    pub fn full_order(&self) -> &[CellId] {
        &self.order
    }

    /// Get cells that need re-execution when `changed` cells get new values.
    ///
    /// Returns every cell reachable from `changed` along dependency edges,
    /// once each, in full-order position. A changed cell is only included
    /// when another changed cell reaches it; its own new value is not a
    /// reason to re-run it.
    pub fn affected_order(&self, changed: &[CellId]) -> Vec<CellId> {
        let seeds = changed
            .iter()
            .filter(|id| id.0 < self.order.len())
            .flat_map(|id| self.dependents[id.0].iter().copied());
        self.ordered(self.reach(seeds, &self.dependents))
    }

    /// Like [`affected_order`](Self::affected_order), but the `changed`
    /// cells themselves are always included.
    pub fn closure_order(&self, changed: &[CellId]) -> Vec<CellId> {
        let seeds = changed.iter().copied().filter(|id| id.0 < self.order.len());
        self.ordered(self.reach(seeds, &self.dependents))
    }

    /// Every cell that `cells` transitively read from, excluding `cells`
    /// unless one reaches another, in full-order position.
    pub fn upstream_of(&self, cells: &[CellId]) -> Vec<CellId> {
        let seeds = cells
            .iter()
            .filter(|id| id.0 < self.order.len())
            .flat_map(|id| self.dependencies[id.0].iter().copied());
        self.ordered(self.reach(seeds, &self.dependencies))
    }

    /// Group cells by dependency depth.
    ///
    /// Level 0 holds cells with no dependencies; each later level depends
    /// only on earlier ones. Cells within a level are in full order.
    pub fn levels(&self) -> Vec<Vec<CellId>> {
        let mut depth = vec![0usize; self.order.len()];
        let mut levels: Vec<Vec<CellId>> = Vec::new();

        for &id in &self.order {
            let d = self.dependencies[id.0]
                .iter()
                .map(|dep| depth[dep.0] + 1)
                .max()
                .unwrap_or(0);
            depth[id.0] = d;
            if levels.len() <= d {
                levels.resize_with(d + 1, Vec::new);
            }
            levels[d].push(id);
        }

        levels
    }

    /// Position of a cell in the full order.
    pub fn position(&self, id: CellId) -> Option<usize> {
        self.rank.get(id.0).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Breadth-first reachability from `seeds` over `edges`, seeds included.
    fn reach(&self, seeds: impl Iterator<Item = CellId>, edges: &[Vec<CellId>]) -> Vec<bool> {
        let mut visited = vec![false; self.order.len()];
        let mut queue = VecDeque::new();

        for seed in seeds {
            if !visited[seed.0] {
                visited[seed.0] = true;
                queue.push_back(seed);
            }
        }

        while let Some(id) = queue.pop_front() {
            for &next in &edges[id.0] {
                if !visited[next.0] {
                    visited[next.0] = true;
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    fn ordered(&self, visited: Vec<bool>) -> Vec<CellId> {
        self.order
            .iter()
            .copied()
            .filter(|id| visited[id.0])
            .collect()
    }
}
