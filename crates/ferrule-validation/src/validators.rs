//! Core validation engine
//!
//! Walks a [`Value`] against a [`TypeDescriptor`] and accumulates every
//! mismatch instead of stopping at the first one.

use crate::constraints::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints, StringFormat};
use crate::errors::{ErrorType, ValidationContext, ValidationError, ValidationErrors, ValidationResult};
use crate::formats;
use crate::types::{TypeDescriptor, Value};
use regex::Regex;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Public API
// ============================================================================

/// Validate a value against a type descriptor
///
/// # Example
///
/// ```
/// use ferrule_validation::{TypeDescriptor, Value, validate};
///
/// let email_type = TypeDescriptor::Email;
/// let value = Value::String("user@example.com".to_string());
///
/// assert!(validate(&value, &email_type).is_ok());
/// ```
pub fn validate(value: &Value, type_desc: &TypeDescriptor) -> ValidationResult<()> {
    let mut ctx = ValidationContext::new();
    validate_with_context(value, type_desc, &mut ctx)
}

/// Validate starting from an existing path (e.g. a parent field)
pub fn validate_with_context(
    value: &Value,
    type_desc: &TypeDescriptor,
    ctx: &mut ValidationContext,
) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    validate_value(value, type_desc, ctx, &mut errors);
    errors.into_result()
}

/// Parse raw JSON bytes and validate the document against `type_desc`.
///
/// Malformed JSON yields a single root-level [`ErrorType::JsonInvalid`] error.
#[cfg(feature = "serde")]
pub fn validate_json(bytes: &[u8], type_desc: &TypeDescriptor) -> ValidationResult<serde_json::Value> {
    let document: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
        ValidationErrors::single(ValidationError::invalid_json(format!("Invalid JSON: {}", e)))
    })?;
    validate(&Value::from(&document), type_desc)?;
    Ok(document)
}

// ============================================================================
// Core Validation Function
// ============================================================================

/// Recursive worker behind [`validate`]
pub fn validate_value(
    value: &Value,
    type_desc: &TypeDescriptor,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    match type_desc {
        TypeDescriptor::String(constraints) => validate_string(value, constraints, ctx, errors),
        TypeDescriptor::Int64(constraints) => validate_int64(value, constraints, ctx, errors),
        TypeDescriptor::Float64(constraints) => validate_float64(value, constraints, ctx, errors),
        TypeDescriptor::Bool => {
            if !matches!(value, Value::Bool(_)) {
                errors.add(expected("boolean", value, ctx));
            }
        }
        TypeDescriptor::Null => {
            if !value.is_null() {
                errors.add(expected("null", value, ctx));
            }
        }
        TypeDescriptor::List { items, constraints } => {
            validate_list(value, items, constraints, ctx, errors)
        }
        TypeDescriptor::Object { fields, additional, .. } => {
            validate_object(value, fields, additional.as_deref(), ctx, errors)
        }
        TypeDescriptor::Optional(inner) => {
            if !value.is_null() {
                validate_value(value, inner, ctx, errors);
            }
        }
        TypeDescriptor::Union { variants, nullable } => {
            validate_union(value, variants, *nullable, ctx, errors)
        }
        TypeDescriptor::Enum { values } => validate_enum(value, values, ctx, errors),
        TypeDescriptor::Email => validate_formatted(value, StringFormat::Email, ctx, errors),
        TypeDescriptor::Url => validate_formatted(value, StringFormat::Url, ctx, errors),
        TypeDescriptor::Uuid => validate_formatted(value, StringFormat::Uuid, ctx, errors),
        TypeDescriptor::DateTime => validate_formatted(value, StringFormat::DateTime, ctx, errors),
        TypeDescriptor::Date => validate_formatted(value, StringFormat::Date, ctx, errors),
        TypeDescriptor::Time => validate_formatted(value, StringFormat::Time, ctx, errors),
        TypeDescriptor::Any => {}
    }
}

fn expected(what: &str, value: &Value, ctx: &ValidationContext) -> ValidationError {
    ValidationError::type_error(
        ctx.current(),
        format!("Expected {}, got {}", what, value.type_name()),
    )
}

// ============================================================================
// String Validation
// ============================================================================

fn validate_string(
    value: &Value,
    constraints: &StringConstraints,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let s = match value {
        Value::String(s) => s,
        _ => {
            errors.add(expected("string", value, ctx));
            return;
        }
    };

    let char_count = s.chars().count();

    if let Some(min) = constraints.min_length {
        if char_count < min {
            errors.add(ValidationError::value_error(
                ctx.current(),
                format!("String must be at least {} characters (got {})", min, char_count),
            ));
        }
    }

    if let Some(max) = constraints.max_length {
        if char_count > max {
            errors.add(ValidationError::value_error(
                ctx.current(),
                format!("String must be at most {} characters (got {})", max, char_count),
            ));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(s) => {
                errors.add(ValidationError::value_error(
                    ctx.current(),
                    format!("String does not match pattern: {}", pattern),
                ));
            }
            Ok(_) => {}
            Err(_) => {
                errors.add(ValidationError::value_error(
                    ctx.current(),
                    format!("Invalid regex pattern: {}", pattern),
                ));
            }
        }
    }

    if let Some(format) = constraints.format {
        check_format(s, format, ctx, errors);
    }
}

fn check_format(s: &str, format: StringFormat, ctx: &ValidationContext, errors: &mut ValidationErrors) {
    let (is_valid, format_name) = match format {
        StringFormat::Email => (formats::validate_email(s), "email"),
        StringFormat::Url => (formats::validate_url(s), "URL"),
        StringFormat::Uuid => (formats::validate_uuid(s), "UUID"),
        StringFormat::DateTime => (formats::validate_datetime(s), "datetime (ISO 8601)"),
        StringFormat::Date => (formats::validate_date(s), "date (YYYY-MM-DD)"),
        StringFormat::Time => (formats::validate_time(s), "time (HH:MM:SS)"),
    };

    if !is_valid {
        errors.add(ValidationError::new(
            ctx.current(),
            format!("Invalid {} format", format_name),
            ErrorType::FormatError,
        ));
    }
}

/// Format-only descriptors (`Email`, `Uuid`, `Date`, ...) must be strings first
fn validate_formatted(
    value: &Value,
    format: StringFormat,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    match value {
        Value::String(s) => check_format(s, format, ctx, errors),
        _ => errors.add(expected(&format!("{} string", format.as_str()), value, ctx)),
    }
}

// ============================================================================
// Numeric Validation
// ============================================================================

fn validate_int64(
    value: &Value,
    constraints: &NumericConstraints<i64>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    match value {
        Value::Int(n) => validate_numeric_constraints(*n, constraints, ctx, errors),
        _ => errors.add(expected("integer", value, ctx)),
    }
}

fn validate_float64(
    value: &Value,
    constraints: &NumericConstraints<f64>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    let num = match value {
        Value::Float(f) => *f,
        Value::Int(i) => *i as f64,
        _ => {
            errors.add(expected("number", value, ctx));
            return;
        }
    };
    validate_numeric_constraints(num, constraints, ctx, errors);
}

fn validate_numeric_constraints<T>(
    value: T,
    constraints: &NumericConstraints<T>,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) where
    T: PartialOrd + std::fmt::Display + Copy,
{
    let checks = [
        (constraints.minimum, value >= constraints.minimum.unwrap_or(value), ">="),
        (constraints.maximum, value <= constraints.maximum.unwrap_or(value), "<="),
        (
            constraints.exclusive_minimum,
            constraints.exclusive_minimum.map_or(true, |min| value > min),
            ">",
        ),
        (
            constraints.exclusive_maximum,
            constraints.exclusive_maximum.map_or(true, |max| value < max),
            "<",
        ),
    ];

    for (bound, ok, op) in checks {
        if let (Some(bound), false) = (bound, ok) {
            errors.add(ValidationError::value_error(
                ctx.current(),
                format!("Value must be {} {} (got {})", op, bound, value),
            ));
        }
    }
}

// ============================================================================
// Collection Types
// ============================================================================

fn validate_list(
    value: &Value,
    item_type: &TypeDescriptor,
    constraints: &ListConstraints,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let items = match value {
        Value::List(items) => items,
        _ => {
            errors.add(expected("array", value, ctx));
            return;
        }
    };

    if let Some(min) = constraints.min_items {
        if items.len() < min {
            errors.add(ValidationError::value_error(
                ctx.current(),
                format!("List must have at least {} items (got {})", min, items.len()),
            ));
        }
    }

    if let Some(max) = constraints.max_items {
        if items.len() > max {
            errors.add(ValidationError::value_error(
                ctx.current(),
                format!("List must have at most {} items (got {})", max, items.len()),
            ));
        }
    }

    for (i, item) in items.iter().enumerate() {
        ctx.push(i.to_string());
        validate_value(item, item_type, ctx, errors);
        ctx.pop();
    }
}

fn validate_object(
    value: &Value,
    fields: &[FieldDescriptor],
    additional: Option<&TypeDescriptor>,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    let pairs = match value {
        Value::Object(pairs) => pairs,
        _ => {
            errors.add(expected("object", value, ctx));
            return;
        }
    };

    let obj_map: HashMap<&str, &Value> = pairs.iter().map(|(k, v)| (k.as_str(), v)).collect();

    for field_desc in fields {
        let wire_name = field_desc.wire_name();
        ctx.push(wire_name);
        match obj_map.get(wire_name) {
            Some(field_value) => validate_value(field_value, &field_desc.type_desc, ctx, errors),
            None if field_desc.required && field_desc.default.is_none() => {
                errors.add(ValidationError::missing_error(ctx.current()));
            }
            None => {}
        }
        ctx.pop();
    }

    if let Some(additional_type) = additional {
        let known: HashSet<&str> = fields.iter().map(|f| f.wire_name()).collect();
        for (key, val) in pairs {
            if !known.contains(key.as_str()) {
                ctx.push(key.as_str());
                validate_value(val, additional_type, ctx, errors);
                ctx.pop();
            }
        }
    }
}

// ============================================================================
// Special Types
// ============================================================================

fn validate_union(
    value: &Value,
    variants: &[TypeDescriptor],
    nullable: bool,
    ctx: &mut ValidationContext,
    errors: &mut ValidationErrors,
) {
    if value.is_null() {
        if !nullable {
            errors.add(ValidationError::type_error(ctx.current(), "Value cannot be null"));
        }
        return;
    }

    for variant in variants {
        let mut attempt = ValidationErrors::new();
        let mut scratch = ctx.clone();
        validate_value(value, variant, &mut scratch, &mut attempt);
        if attempt.is_empty() {
            return;
        }
    }

    let variant_types: Vec<&str> = variants.iter().map(|v| v.type_name()).collect();
    errors.add(ValidationError::type_error(
        ctx.current(),
        format!("Value does not match any of: [{}]", variant_types.join(", ")),
    ));
}

fn validate_enum(
    value: &Value,
    allowed_values: &[Value],
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) {
    if allowed_values.contains(value) {
        return;
    }

    let formatted: Vec<String> = allowed_values
        .iter()
        .map(|v| match v {
            Value::String(s) => format!("\"{}\"", s),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => b.to_string(),
            other => format!("{:?}", other),
        })
        .collect();

    errors.add(ValidationError::value_error(
        ctx.current(),
        format!("Value must be one of: [{}]", formatted.join(", ")),
    ));
}
