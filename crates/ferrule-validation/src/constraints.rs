//! Validation constraints for strings, numbers, lists and object fields.

use crate::types::{TypeDescriptor, Value};

/// Constraints for string validation
#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    /// Minimum length (in characters, not bytes)
    pub min_length: Option<usize>,
    /// Maximum length (in characters, not bytes)
    pub max_length: Option<usize>,
    /// Regex pattern (compiled at validation time)
    pub pattern: Option<String>,
    /// Predefined format validator
    pub format: Option<StringFormat>,
}

/// Predefined string format validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    DateTime,
    Date,
    Time,
}

impl StringFormat {
    /// Name used in documentation (`format` keyword)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "uri",
            Self::Uuid => "uuid",
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

/// Constraints for numeric validation (generic over i64 and f64)
#[derive(Debug, Clone, Default)]
pub struct NumericConstraints<T> {
    /// Minimum value (inclusive)
    pub minimum: Option<T>,
    /// Maximum value (inclusive)
    pub maximum: Option<T>,
    /// Minimum value (exclusive)
    pub exclusive_minimum: Option<T>,
    /// Maximum value (exclusive)
    pub exclusive_maximum: Option<T>,
}

/// Constraints for list/array validation
#[derive(Debug, Clone, Default)]
pub struct ListConstraints {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

/// Field descriptor for object validation
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Type descriptor for this field
    pub type_desc: TypeDescriptor,
    /// Whether this field is required
    pub required: bool,
    /// Default value if field is missing
    pub default: Option<Value>,
    /// Optional description for documentation
    pub description: Option<String>,
    /// Wire name used on input and output instead of `name`
    pub alias: Option<String>,
}

impl FieldDescriptor {
    /// Create a new required field
    pub fn new(name: impl Into<String>, type_desc: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            type_desc,
            required: true,
            default: None,
            description: None,
            alias: None,
        }
    }

    /// Set field as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set default value (implies optional)
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the field has on the wire
    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}
