//! Execution context and callbacks for Ripple cells.
//!
//! The [`ExecutionContext`] is the live name → value store that cells read
//! from and the presentation layer observes. [`ExecutionCallback`] reports
//! progress while a cascade runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::CellFailure;
use crate::graph::CellId;
use crate::value::Value;

/// A stored value with its content fingerprint.
#[derive(Debug, Clone)]
struct Slot {
    value: Arc<Value>,
    fingerprint: u64,
}

/// Live mapping from variable name to current value.
///
/// Only the kernel writes to the context. Reads hand out `Arc`s, so callers
/// can hold on to a value while later cascades replace it.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    slots: FxHashMap<String, Slot>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current value of `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Value>> {
        self.slots.get(name).map(|slot| Arc::clone(&slot.value))
    }

    /// Get the fingerprint of the current value of `name`.
    pub fn fingerprint(&self, name: &str) -> Option<u64> {
        self.slots.get(name).map(|slot| slot.fingerprint)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Store a value. Returns `true` if the stored content changed.
    ///
    /// Differing fingerprints settle it; equal ones fall back to comparing
    /// content, since distinct values can share a fingerprint.
    pub(crate) fn insert(&mut self, name: &str, value: Value) -> bool {
        let fingerprint = value.fingerprint();
        let value = Arc::new(value);

        match self.slots.get_mut(name) {
            Some(slot) => {
                let changed =
                    slot.fingerprint != fingerprint || !slot.value.same_content(&value);
                *slot = Slot { value, fingerprint };
                changed
            }
            None => {
                self.slots
                    .insert(name.to_string(), Slot { value, fingerprint });
                true
            }
        }
    }

    /// Copy of the whole context, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.value.as_ref().clone()))
            .collect()
    }

    /// Canonical JSON encoding of the context.
    ///
    /// Names are sorted, so identical contexts always encode to identical
    /// bytes.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let ordered: BTreeMap<&str, &Value> = self
            .slots
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.value.as_ref()))
            .collect();
        serde_json::to_string(&ordered)
    }

    /// Defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Callback trait for execution progress reporting.
pub trait ExecutionCallback: Send + Sync {
    /// Called when a cell starts executing.
    fn on_cell_started(&self, cell_id: CellId, name: &str);

    /// Called when a cell completes successfully.
    fn on_cell_completed(&self, cell_id: CellId, name: &str);

    /// Called when a cell execution fails.
    fn on_cell_error(&self, cell_id: CellId, name: &str, error: &CellFailure);

    /// Called before the first cell of a cascade runs.
    fn on_cascade_started(&self, _cell_count: usize) {}

    /// Called after a cascade finishes or halts.
    fn on_cascade_completed(&self, _executed: usize) {}
}
