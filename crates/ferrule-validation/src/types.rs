//! Core type system for validation
//!
//! This module defines the type descriptors and value types used for validation.

use crate::constraints::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints};

// ============================================================================
// Value Enum - Runtime values to be validated
// ============================================================================

/// Runtime value that can be validated
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Object fields in input order
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

// ============================================================================
// TypeDescriptor - Type definitions for validation
// ============================================================================

/// Structural description of a value shape.
///
/// Used both to validate incoming data and to derive documentation schemas.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// String type with constraints (length, pattern, format)
    String(StringConstraints),

    /// Integer type with numeric constraints (i64)
    Int64(NumericConstraints<i64>),

    /// Float type with numeric constraints (f64)
    Float64(NumericConstraints<f64>),

    Bool,

    Null,

    /// List/Array type with item type and constraints
    List {
        items: Box<TypeDescriptor>,
        constraints: ListConstraints,
    },

    /// Object type with named fields
    Object {
        /// Optional model name, used as the schema title
        name: Option<String>,
        fields: Vec<FieldDescriptor>,
        /// Type for additional properties not in fields
        additional: Option<Box<TypeDescriptor>>,
    },

    /// Nullable wrapper
    Optional(Box<TypeDescriptor>),

    /// Value must match one of the variants
    Union {
        variants: Vec<TypeDescriptor>,
        nullable: bool,
    },

    /// Value must equal one of the allowed values
    Enum { values: Vec<Value> },

    Email,
    Url,
    Uuid,
    /// ISO 8601 date-time string
    DateTime,
    /// `YYYY-MM-DD` string
    Date,
    /// `HH:MM:SS` string
    Time,

    /// No validation
    Any,
}

impl TypeDescriptor {
    pub fn string() -> Self {
        Self::String(StringConstraints::default())
    }

    pub fn int() -> Self {
        Self::Int64(NumericConstraints::default())
    }

    pub fn float() -> Self {
        Self::Float64(NumericConstraints::default())
    }

    pub fn list(items: TypeDescriptor) -> Self {
        Self::List {
            items: Box::new(items),
            constraints: ListConstraints::default(),
        }
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Named object shape
    pub fn object(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::Object {
            name: Some(name.into()),
            fields,
            additional: None,
        }
    }

    /// Get human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int64(_) => "integer",
            Self::Float64(_) => "float",
            Self::Bool => "boolean",
            Self::Null => "null",
            Self::List { .. } => "array",
            Self::Object { .. } => "object",
            Self::Optional(_) => "optional",
            Self::Union { .. } => "union",
            Self::Enum { .. } => "enum",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Time => "time",
            Self::Any => "any",
        }
    }

    /// Object fields, if this describes an object
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match self {
            Self::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

#[cfg(feature = "serde")]
impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(feature = "serde")]
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::Number(i.into()),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Int(42).type_name(), "integer");
        assert_eq!(Value::String("test".to_string()).type_name(), "string");
        assert_eq!(Value::Object(vec![]).type_name(), "object");
    }

    #[test]
    fn test_type_descriptor_fields() {
        let desc = TypeDescriptor::object("User", vec![FieldDescriptor::new("id", TypeDescriptor::int())]);
        assert_eq!(desc.fields().map(|f| f.len()), Some(1));
        assert!(TypeDescriptor::Bool.fields().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_numbers() {
        let json = serde_json::json!({"a": 1, "b": 1.5, "c": [true, null]});
        let value = Value::from(&json);
        match value {
            Value::Object(fields) => {
                assert_eq!(fields[0], ("a".to_string(), Value::Int(1)));
                assert_eq!(fields[1], ("b".to_string(), Value::Float(1.5)));
                assert_eq!(
                    fields[2],
                    ("c".to_string(), Value::List(vec![Value::Bool(true), Value::Null]))
                );
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_into_json_round_trip_shape() {
        let value = Value::Object(vec![("id".to_string(), Value::Int(7))]);
        let json: serde_json::Value = value.into();
        assert_eq!(json, serde_json::json!({"id": 7}));
    }
}
