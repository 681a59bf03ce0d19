//! Values exchanged between cells.
//!
//! Cells are opaque functions, so the kernel needs one value type that every
//! body can read and write. [`Value`] is that type: a small, JSON-shaped enum
//! that serializes with serde and can be fingerprinted for change detection.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// A value stored in the execution context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Boolean value (for checkboxes).
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value (for sliders).
    Float(f64),
    /// Text value (for text inputs and rendered markdown).
    Text(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// String-keyed map, ordered by key.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Get as bool if it's a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if it's an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if it's numeric. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as str if it's text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if it's a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map if it's a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Parse a command-line style literal.
    ///
    /// JSON literals (`42`, `1.5`, `true`, `[1,2]`, `"quoted"`) parse as JSON;
    /// anything else becomes [`Value::Text`].
    pub fn parse_literal(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::Text(raw.to_string()))
    }

    /// Content fingerprint. Different fingerprints mean different values;
    /// equal fingerprints say nothing, see [`Value::same_content`].
    ///
    /// Floats hash by bit pattern, so a `NaN` fingerprints equal to itself.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hash_value(self, &mut hasher);
        hasher.finish()
    }

    /// Structural equality with floats compared by bit pattern.
    ///
    /// Unlike `==`, a `NaN` equals itself and `0.0` differs from `-0.0`.
    pub fn same_content(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_content(vb))
            }
            _ => self == other,
        }
    }
}

fn hash_value(value: &Value, hasher: &mut FxHasher) {
    // Variant tag first so `Int(1)` and `Float(1.0)` differ.
    match value {
        Value::Null => hasher.write_u8(0),
        Value::Bool(b) => {
            hasher.write_u8(1);
            hasher.write_u8(*b as u8);
        }
        Value::Int(i) => {
            hasher.write_u8(2);
            hasher.write_i64(*i);
        }
        Value::Float(f) => {
            hasher.write_u8(3);
            hasher.write_u64(f.to_bits());
        }
        Value::Text(s) => {
            hasher.write_u8(4);
            hasher.write_usize(s.len());
            hasher.write(s.as_bytes());
        }
        Value::List(items) => {
            hasher.write_u8(5);
            hasher.write_usize(items.len());
            for item in items {
                hash_value(item, hasher);
            }
        }
        Value::Map(map) => {
            hasher.write_u8(6);
            hasher.write_usize(map.len());
            for (key, item) in map {
                hasher.write_usize(key.len());
                hasher.write(key.as_bytes());
                hash_value(item, hasher);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{:?}", other),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(3).as_int(), Some(3));
        assert_eq!(Value::from(3).as_float(), Some(3.0));
        assert_eq!(Value::from(2.5).as_int(), None);
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(vec![1, 2]).as_list().map(|l| l.len()), Some(2));
        assert_eq!(Value::Null.kind(), "null");
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("42"), Value::Int(42));
        assert_eq!(Value::parse_literal("1.5"), Value::Float(1.5));
        assert_eq!(Value::parse_literal("false"), Value::Bool(false));
        assert_eq!(
            Value::parse_literal("[1, 2]"),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::parse_literal("\"x\""), Value::Text("x".into()));
        assert_eq!(Value::parse_literal("hello"), Value::Text("hello".into()));
    }

    #[test]
    fn test_fingerprint_distinguishes_variants() {
        assert_ne!(Value::Int(1).fingerprint(), Value::Float(1.0).fingerprint());
        assert_ne!(
            Value::Text("1".into()).fingerprint(),
            Value::Int(1).fingerprint()
        );
        assert_eq!(
            Value::from(vec![1, 2, 3]).fingerprint(),
            Value::from(vec![1, 2, 3]).fingerprint()
        );
    }

    #[test]
    fn test_fingerprint_nan_is_stable() {
        let nan = Value::Float(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert_eq!(nan.fingerprint(), nan.clone().fingerprint());
    }

    #[test]
    fn test_same_content() {
        assert!(Value::Float(f64::NAN).same_content(&Value::Float(f64::NAN)));
        assert!(!Value::Float(0.0).same_content(&Value::Float(-0.0)));
        assert!(!Value::Int(1).same_content(&Value::Float(1.0)));
        assert!(Value::from(vec![1.5, 2.0]).same_content(&Value::from(vec![1.5, 2.0])));
        assert!(!Value::from(vec![1, 2]).same_content(&Value::from(vec![1, 2, 3])));

        let map = |v: i64| Value::Map(BTreeMap::from([("k".to_string(), Value::Int(v))]));
        assert!(map(1).same_content(&map(1)));
        assert!(!map(1).same_content(&map(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_json_shape() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Int(1));
        map.insert("a".to_string(), Value::Bool(true));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"a":true,"b":1}"#);
    }
}
