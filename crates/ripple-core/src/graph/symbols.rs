//! Symbol table: which cell defines each name.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

use super::types::{Cell, CellId};

/// Mapping from variable name to the single cell that defines it.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    definitions: FxHashMap<String, CellId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every name `cell` writes.
    ///
    /// Names already claimed by another cell are left with their first
    /// definer and reported as [`Error::DuplicateDefinition`]; the remaining
    /// names are still registered.
    pub fn register(&mut self, id: CellId, cell: &Cell) -> Result<()> {
        let mut duplicates = Vec::new();

        for name in cell.writes() {
            match self.definitions.get(name) {
                Some(&first) if first != id => duplicates.push(Error::DuplicateDefinition {
                    name: name.clone(),
                    first,
                    second: id,
                }),
                Some(_) => {}
                None => {
                    self.definitions.insert(name.clone(), id);
                }
            }
        }

        match Error::from_issues(duplicates) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Get the cell that defines `name`.
    pub fn resolve(&self, name: &str) -> Result<CellId> {
        self.get(name).ok_or_else(|| Error::UndefinedName {
            name: name.to_string(),
            reader: None,
        })
    }

    pub fn get(&self, name: &str) -> Option<CellId> {
        self.definitions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// All defined names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Outputs;

    fn make_cell(writes: &[&str]) -> Cell {
        Cell::new("test", &[], writes, |_| Ok(Outputs::new()))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut symbols = SymbolTable::new();
        symbols.register(CellId::new(0), &make_cell(&["x", "y"])).unwrap();

        assert_eq!(symbols.resolve("x").unwrap(), CellId::new(0));
        assert_eq!(symbols.resolve("y").unwrap(), CellId::new(0));
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols.names(), ["x", "y"]);
    }

    #[test]
    fn test_resolve_undefined() {
        let symbols = SymbolTable::new();
        let err = symbols.resolve("nope").unwrap_err();
        assert!(matches!(err, Error::UndefinedName { ref name, reader: None } if name == "nope"));
    }

    #[test]
    fn test_duplicate_definition() {
        let mut symbols = SymbolTable::new();
        symbols.register(CellId::new(0), &make_cell(&["x"])).unwrap();

        let err = symbols
            .register(CellId::new(1), &make_cell(&["x", "z"]))
            .unwrap_err();
        match err {
            Error::DuplicateDefinition {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "x");
                assert_eq!(first, CellId::new(0));
                assert_eq!(second, CellId::new(1));
            }
            other => panic!("unexpected error: {other}"),
        }

        // First definer wins; the non-conflicting name is still registered.
        assert_eq!(symbols.get("x"), Some(CellId::new(0)));
        assert_eq!(symbols.get("z"), Some(CellId::new(1)));
    }

    #[test]
    fn test_several_duplicates_in_one_cell() {
        let mut symbols = SymbolTable::new();
        symbols.register(CellId::new(0), &make_cell(&["a", "b"])).unwrap();

        let err = symbols
            .register(CellId::new(1), &make_cell(&["a", "b"]))
            .unwrap_err();
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_reregister_same_cell_is_noop() {
        let mut symbols = SymbolTable::new();
        let cell = make_cell(&["x"]);
        symbols.register(CellId::new(0), &cell).unwrap();
        symbols.register(CellId::new(0), &cell).unwrap();
        assert_eq!(symbols.len(), 1);
    }
}
