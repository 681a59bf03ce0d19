//! Types for the graph engine.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{BoxError, InputError};
use crate::value::Value;

/// Unique identifier for a cell within a notebook.
///
/// Ids are assigned in declaration order, starting at zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell_{}", self.0)
    }
}

/// Executable body of a cell.
///
/// A body maps the cell's named inputs to its named outputs. The kernel never
/// looks inside; closures of the right shape implement this automatically.
pub trait CellBody: Send + Sync {
    /// Compute the cell's outputs from its inputs.
    fn run(&self, inputs: &Inputs) -> Result<Outputs, BoxError>;
}

impl<F> CellBody for F
where
    F: Fn(&Inputs) -> Result<Outputs, BoxError> + Send + Sync,
{
    fn run(&self, inputs: &Inputs) -> Result<Outputs, BoxError> {
        self(inputs)
    }
}

/// Body of an input cell: returns its initial value unchanged.
struct Constant {
    name: String,
    value: Value,
}

impl CellBody for Constant {
    fn run(&self, _inputs: &Inputs) -> Result<Outputs, BoxError> {
        Ok(Outputs::single(self.name.clone(), self.value.clone()))
    }
}

/// A unit of computation with declared inputs and outputs.
#[derive(Clone)]
pub struct Cell {
    /// Display name
    name: String,
    /// Names read, in declaration order, without duplicates
    reads: Vec<String>,
    /// Names written, in declaration order, without duplicates
    writes: Vec<String>,
    /// Opaque body
    body: Arc<dyn CellBody>,
    /// Whether this cell is driven by `set_value` (a widget)
    is_input: bool,
}

impl Cell {
    /// Create a cell from a closure.
    pub fn new<F>(name: impl Into<String>, reads: &[&str], writes: &[&str], body: F) -> Self
    where
        F: Fn(&Inputs) -> Result<Outputs, BoxError> + Send + Sync + 'static,
    {
        Self::with_body(name, reads, writes, body)
    }

    /// Create a cell from any [`CellBody`] implementation.
    pub fn with_body(
        name: impl Into<String>,
        reads: &[&str],
        writes: &[&str],
        body: impl CellBody + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            reads: unique_names(reads),
            writes: unique_names(writes),
            body: Arc::new(body),
            is_input: false,
        }
    }

    /// Create an input cell (a widget) that defines `name` with an initial value.
    ///
    /// The cell reads nothing; later values arrive through `Kernel::set_value`.
    pub fn input(name: impl Into<String>, initial: impl Into<Value>) -> Self {
        let name = name.into();
        let body = Constant {
            name: name.clone(),
            value: initial.into(),
        };
        Self {
            reads: Vec::new(),
            writes: vec![name.clone()],
            name,
            body: Arc::new(body),
            is_input: true,
        }
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the names this cell reads.
    pub fn reads(&self) -> &[String] {
        &self.reads
    }

    /// Get the names this cell writes.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Whether this cell was created with [`Cell::input`].
    pub fn is_input(&self) -> bool {
        self.is_input
    }

    pub(crate) fn body(&self) -> &dyn CellBody {
        self.body.as_ref()
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("is_input", &self.is_input)
            .finish_non_exhaustive()
    }
}

fn unique_names(names: &[&str]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    names
        .iter()
        .filter(|name| seen.insert(**name))
        .map(|name| name.to_string())
        .collect()
}

/// Named values passed to a cell body, in the cell's read order.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: Vec<(String, Arc<Value>)>,
}

impl Inputs {
    pub(crate) fn new(values: Vec<(String, Arc<Value>)>) -> Self {
        Self { values }
    }

    /// Get an input by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_ref())
    }

    /// Get an input by name, failing if absent.
    pub fn value(&self, name: &str) -> Result<&Value, InputError> {
        self.get(name)
            .ok_or_else(|| InputError::Missing(name.to_string()))
    }

    /// Get an integer input.
    pub fn int(&self, name: &str) -> Result<i64, InputError> {
        let value = self.value(name)?;
        value.as_int().ok_or_else(|| wrong_type(name, "int", value))
    }

    /// Get a numeric input as f64 (integers are widened).
    pub fn float(&self, name: &str) -> Result<f64, InputError> {
        let value = self.value(name)?;
        value.as_float().ok_or_else(|| wrong_type(name, "float", value))
    }

    /// Get a boolean input.
    pub fn bool(&self, name: &str) -> Result<bool, InputError> {
        let value = self.value(name)?;
        value.as_bool().ok_or_else(|| wrong_type(name, "bool", value))
    }

    /// Get a text input.
    pub fn text(&self, name: &str) -> Result<&str, InputError> {
        let value = self.value(name)?;
        value.as_str().ok_or_else(|| wrong_type(name, "text", value))
    }

    /// Get a list input.
    pub fn list(&self, name: &str) -> Result<&[Value], InputError> {
        let value = self.value(name)?;
        value.as_list().ok_or_else(|| wrong_type(name, "list", value))
    }

    /// Iterate over inputs in read order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn wrong_type(name: &str, expected: &'static str, found: &Value) -> InputError {
    InputError::WrongType {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Named values returned by a cell body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    values: Vec<(String, Value)>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs with a single named value.
    pub fn single(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().with(name, value)
    }

    /// Builder-style [`Outputs::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an output, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    /// Remove and return the value stored under `name`.
    pub(crate) fn take(&mut self, name: &str) -> Option<Value> {
        let idx = self.values.iter().position(|(n, _)| n == name)?;
        Some(self.values.swap_remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Outputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut outputs = Outputs::new();
        for (name, value) in iter {
            outputs.insert(name, value);
        }
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, Value)]) -> Inputs {
        Inputs::new(
            pairs
                .iter()
                .map(|(n, v)| (n.to_string(), Arc::new(v.clone())))
                .collect(),
        )
    }

    #[test]
    fn test_cell_id_display() {
        assert_eq!(CellId::new(7).to_string(), "cell_7");
        assert_eq!(CellId::new(7).as_usize(), 7);
    }

    #[test]
    fn test_cell_dedups_names() {
        let cell = Cell::new("c", &["a", "b", "a"], &["x", "x"], |_| Ok(Outputs::new()));
        assert_eq!(cell.reads(), ["a", "b"]);
        assert_eq!(cell.writes(), ["x"]);
        assert!(!cell.is_input());
    }

    #[test]
    fn test_input_cell() {
        let cell = Cell::input("limit", 10);
        assert!(cell.is_input());
        assert!(cell.reads().is_empty());
        assert_eq!(cell.writes(), ["limit"]);

        let out = cell.body().run(&Inputs::default()).unwrap();
        assert_eq!(out.get("limit"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_typed_inputs() {
        let inputs = inputs(&[
            ("n", Value::Int(4)),
            ("s", Value::from("hi")),
            ("xs", Value::from(vec![1, 2])),
        ]);
        assert_eq!(inputs.int("n").unwrap(), 4);
        assert_eq!(inputs.float("n").unwrap(), 4.0);
        assert_eq!(inputs.text("s").unwrap(), "hi");
        assert_eq!(inputs.list("xs").unwrap().len(), 2);
        assert_eq!(inputs.len(), 3);

        let err = inputs.int("s").unwrap_err();
        assert_eq!(err.to_string(), "input `s` is text, expected int");
        assert!(matches!(inputs.int("zz"), Err(InputError::Missing(_))));
    }

    #[test]
    fn test_outputs_insert_replaces() {
        let mut out = Outputs::single("a", 1).with("b", 2);
        out.insert("a", 3);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get("a"), Some(&Value::Int(3)));
        assert_eq!(out.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_outputs_from_iter() {
        let out: Outputs = [("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(out.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_closure_body() {
        let cell = Cell::new("double", &["n"], &["m"], |inputs| {
            Ok(Outputs::single("m", inputs.int("n")? * 2))
        });
        let out = cell.body().run(&inputs(&[("n", Value::Int(21))])).unwrap();
        assert_eq!(out.get("m"), Some(&Value::Int(42)));
    }
}
