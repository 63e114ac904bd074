//! Resource - Dynamically typed configuration values
//!
//! Configuration handed to a provider is a nested mapping of primitive
//! values. Nested blocks follow the schema engine's convention of a list
//! holding a single map.

use std::collections::HashMap;

use crate::schema::TypeError;

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Wrap a single map in a one-element list (a nested block)
    pub fn block(attributes: HashMap<String, Value>) -> Self {
        Value::List(vec![Value::Map(attributes)])
    }

    /// An empty list, used for absent blocks
    pub fn empty_list() -> Self {
        Value::List(Vec::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

/// Typed, read-only view over an attribute map
///
/// Absent keys read as `Ok(None)`; a key holding a value of the wrong
/// type is a `TypeError::TypeMismatch` naming that key.
#[derive(Debug, Clone, Copy)]
pub struct Attributes<'a> {
    map: &'a HashMap<String, Value>,
}

impl<'a> Attributes<'a> {
    pub fn new(map: &'a HashMap<String, Value>) -> Self {
        Self { map }
    }

    /// View the single map of a nested block value
    ///
    /// Returns `Ok(None)` for an empty list; more than one item is an error.
    pub fn from_block(value: &'a Value) -> Result<Option<Self>, TypeError> {
        match value {
            Value::List(items) if items.len() > 1 => Err(TypeError::TooManyItems {
                max: 1,
                got: items.len(),
            }),
            Value::List(items) => match items.first() {
                None => Ok(None),
                Some(Value::Map(map)) => Ok(Some(Self::new(map))),
                Some(other) => Err(TypeError::TypeMismatch {
                    expected: "Map".to_string(),
                    got: other.type_name(),
                }),
            },
            Value::Map(map) => Ok(Some(Self::new(map))),
            other => Err(TypeError::TypeMismatch {
                expected: "List<Map>".to_string(),
                got: other.type_name(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn string(&self, key: &str) -> Result<Option<&'a str>, TypeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(mismatch(key, "String", other)),
        }
    }

    /// A string attribute where the empty string means "unset"
    pub fn non_empty_string(&self, key: &str) -> Result<Option<&'a str>, TypeError> {
        Ok(self.string(key)?.filter(|s| !s.is_empty()))
    }

    pub fn required_string(&self, key: &str) -> Result<&'a str, TypeError> {
        self.string(key)?.ok_or_else(|| TypeError::MissingRequired {
            name: key.to_string(),
        })
    }

    pub fn int(&self, key: &str) -> Result<Option<i64>, TypeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(mismatch(key, "Int", other)),
        }
    }

    pub fn required_int(&self, key: &str) -> Result<i64, TypeError> {
        self.int(key)?.ok_or_else(|| TypeError::MissingRequired {
            name: key.to_string(),
        })
    }

    pub fn bool(&self, key: &str) -> Result<Option<bool>, TypeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(mismatch(key, "Bool", other)),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, TypeError> {
        Ok(self.bool(key)?.unwrap_or(default))
    }

    pub fn list(&self, key: &str) -> Result<Option<&'a [Value]>, TypeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(items.as_slice())),
            Some(other) => Err(mismatch(key, "List", other)),
        }
    }

    /// Strings of a list or set attribute
    pub fn strings(&self, key: &str) -> Result<Vec<&'a str>, TypeError> {
        let items = self.list(key)?.unwrap_or_default();
        items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.as_str()),
                other => Err(TypeError::ListItemError {
                    index,
                    inner: Box::new(mismatch(key, "String", other)),
                }),
            })
            .collect()
    }

    /// The single map of a nested block attribute
    pub fn block(&self, key: &str) -> Result<Option<Attributes<'a>>, TypeError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => Self::from_block(value).map_err(|e| TypeError::AttributeError {
                name: key.to_string(),
                inner: Box::new(e),
            }),
        }
    }
}

fn mismatch(key: &str, expected: &str, got: &Value) -> TypeError {
    TypeError::AttributeError {
        name: key.to_string(),
        inner: Box::new(TypeError::TypeMismatch {
            expected: expected.to_string(),
            got: got.type_name(),
        }),
    }
}
