//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type,
//! enabling type validation before configuration is expanded.

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Integer within an inclusive range
    IntRange { min: Option<i64>, max: Option<i64> },
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Unordered list of unique values
    Set(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested block: a list of maps with their own attribute schemas
    Block(BlockSchema),
}

/// Attribute schemas of a nested block
#[derive(Debug, Clone, Default)]
pub struct BlockSchema {
    pub attributes: HashMap<String, AttributeSchema>,
    /// Maximum number of blocks (`Some(1)` for a single nested object)
    pub max_items: Option<usize>,
}

impl BlockSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::IntRange { min, max }, Value::Int(n)) => {
                let below = min.is_some_and(|m| *n < m);
                let above = max.is_some_and(|m| *n > m);
                if below || above {
                    Err(TypeError::OutOfRange {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                } else {
                    Ok(())
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner) | AttributeType::Set(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                if matches!(self, AttributeType::Set(_)) {
                    for (i, item) in items.iter().enumerate() {
                        if items[..i].contains(item) {
                            return Err(TypeError::DuplicateSetItem { index: i });
                        }
                    }
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(block), Value::List(items)) => {
                if let Some(max) = block.max_items
                    && items.len() > max
                {
                    return Err(TypeError::TooManyItems {
                        max,
                        got: items.len(),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    let Value::Map(map) = item else {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(TypeError::TypeMismatch {
                                expected: "Map".to_string(),
                                got: item.type_name(),
                            }),
                        });
                    };
                    if let Some(e) = validate_attributes(&block.attributes, map).into_iter().next()
                    {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(e),
                        });
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int | AttributeType::IntRange { .. } => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Value {value} is out of range ({})", describe_range(*min, *max))]
    OutOfRange {
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("Expected at most {max} item(s), got {got}")]
    TooManyItems { max: usize, got: usize },

    #[error("Duplicate set item at index {index}")]
    DuplicateSetItem { index: usize },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

fn describe_range(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("expected {} to {}", lo, hi),
        (Some(lo), None) => format!("expected at least {}", lo),
        (None, Some(hi)) => format!("expected at most {}", hi),
        (None, None) => "unbounded".to_string(),
    }
}

/// How differences between stored and configured values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSuppress {
    /// Strings that differ only in letter case are equal
    CaseInsensitive,
}

impl DiffSuppress {
    pub fn suppresses(&self, old: &Value, new: &Value) -> bool {
        match (self, old, new) {
            (DiffSuppress::CaseInsensitive, Value::String(a), Value::String(b)) => {
                a.eq_ignore_ascii_case(b)
            }
            _ => false,
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Value may be filled in by the provider when not configured
    pub computed: bool,
    /// Computed only; never read from configuration
    pub read_only: bool,
    /// Changing the value requires replacing the resource
    pub force_new: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub diff_suppress: Option<DiffSuppress>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            read_only: false,
            force_new: false,
            default: None,
            description: None,
            diff_suppress: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_diff_suppress(mut self, suppress: DiffSuppress) -> Self {
        self.diff_suppress = Some(suppress);
        self
    }

    /// Attribute is only ever set by the provider
    pub fn read_only(mut self) -> Self {
        self.computed = true;
        self.read_only = true;
        self
    }

    /// Whether a change from `old` to `new` is a real difference
    pub fn differs(&self, old: &Value, new: &Value) -> bool {
        if old == new {
            return false;
        }
        !self
            .diff_suppress
            .is_some_and(|suppress| suppress.suppresses(old, new))
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let errors = validate_attributes(&self.attributes, attributes);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_attributes(
    schemas: &HashMap<String, AttributeSchema>,
    attributes: &HashMap<String, Value>,
) -> Vec<TypeError> {
    let mut errors = Vec::new();

    // Check required attributes
    for (name, schema) in schemas {
        if schema.required && !attributes.contains_key(name) && schema.default.is_none() {
            errors.push(TypeError::MissingRequired { name: name.clone() });
        }
    }

    // Type check each attribute
    for (name, value) in attributes {
        if let Some(schema) = schemas.get(name)
            && let Err(e) = schema.attr_type.validate(value)
        {
            errors.push(TypeError::AttributeError {
                name: name.clone(),
                inner: Box::new(e),
            });
        }
        // Unknown attributes are allowed (for flexibility)
    }

    errors
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Integer between `min` and `max`, inclusive
    pub fn int_between(min: i64, max: i64) -> AttributeType {
        AttributeType::IntRange {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Integer of at least `min`
    pub fn int_at_least(min: i64) -> AttributeType {
        AttributeType::IntRange {
            min: Some(min),
            max: None,
        }
    }

    /// Enum over a fixed list of strings
    pub fn string_in(values: &[&str]) -> AttributeType {
        AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// Set of strings
    pub fn string_set() -> AttributeType {
        AttributeType::Set(Box::new(AttributeType::String))
    }

    /// Non-empty string
    pub fn non_empty_string() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmptyString".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) if s.is_empty() => Err("Value must not be empty".to_string()),
                _ => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_enum_type() {
        let t = types::string_in(&["ReadOnly", "ReadWrite"]);
        assert!(t.validate(&Value::string("ReadOnly")).is_ok());
        assert!(t.validate(&Value::string("readonly")).is_err());
        let err = t.validate(&Value::string("Write")).unwrap_err();
        assert!(err.to_string().contains("ReadOnly, ReadWrite"));
    }

    #[test]
    fn validate_int_range() {
        let t = types::int_between(0, 2048);
        assert!(t.validate(&Value::Int(0)).is_ok());
        assert!(t.validate(&Value::Int(2048)).is_ok());
        assert!(t.validate(&Value::Int(2049)).is_err());
        assert!(t.validate(&Value::Int(-1)).is_err());

        let t = types::int_at_least(0);
        assert!(t.validate(&Value::Int(63)).is_ok());
        let err = t.validate(&Value::Int(-1)).unwrap_err();
        assert_eq!(err.to_string(), "Value -1 is out of range (expected at least 0)");
    }

    #[test]
    fn validate_non_empty_string() {
        let t = types::non_empty_string();
        assert!(t.validate(&Value::string("disk1")).is_ok());
        assert!(t.validate(&Value::string("")).is_err());
        assert!(t.validate(&Value::Int(1)).is_err());
    }

    #[test]
    fn validate_set_rejects_duplicates() {
        let t = types::string_set();
        assert!(
            t.validate(&Value::List(vec![Value::string("a"), Value::string("b")]))
                .is_ok()
        );
        assert!(
            t.validate(&Value::List(vec![Value::string("a"), Value::string("a")]))
                .is_err()
        );
    }

    #[test]
    fn validate_block() {
        let t = AttributeType::Block(
            BlockSchema::new()
                .attribute(
                    AttributeSchema::new("option", types::string_in(&["Local"])).required(),
                )
                .max_items(1),
        );

        let local = || HashMap::from([("option".to_string(), Value::string("Local"))]);
        assert!(t.validate(&Value::block(local())).is_ok());
        assert!(t.validate(&Value::empty_list()).is_ok());

        let two = Value::List(vec![Value::Map(local()), Value::Map(local())]);
        assert!(matches!(
            t.validate(&two),
            Err(TypeError::TooManyItems { max: 1, got: 2 })
        ));

        let missing = Value::block(HashMap::new());
        assert!(t.validate(&missing).is_err());
    }

    #[test]
    fn validate_resource_schema() {
        let schema = ResourceSchema::new("resource")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(AttributeSchema::new("lun", types::int_at_least(0)))
            .attribute(AttributeSchema::new("enabled", AttributeType::Bool));

        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("my-resource".to_string()));
        attrs.insert("lun".to_string(), Value::Int(5));
        attrs.insert("enabled".to_string(), Value::Bool(true));

        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let schema = ResourceSchema::new("disk")
            .attribute(AttributeSchema::new("name", AttributeType::String).required());

        let attrs = HashMap::new();
        let result = schema.validate(&attrs);
        assert!(result.is_err());
    }

    #[test]
    fn case_insensitive_diff() {
        let attr = AttributeSchema::new("storage_account_type", AttributeType::String)
            .with_diff_suppress(DiffSuppress::CaseInsensitive);
        assert!(!attr.differs(&Value::string("Premium_LRS"), &Value::string("premium_lrs")));
        assert!(attr.differs(&Value::string("Premium_LRS"), &Value::string("Standard_LRS")));

        let plain = AttributeSchema::new("name", AttributeType::String);
        assert!(plain.differs(&Value::string("A"), &Value::string("a")));
    }
}
