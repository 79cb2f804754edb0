//! Validation error types
//!
//! Every error is scoped to a field path inside the validated value, so callers
//! can render it as `"<message>: <dotted.path>"`.

use std::fmt;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of validation errors, in the order they were found
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    /// List of individual validation errors
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Create a collection holding a single error
    pub fn single(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Merge another ValidationErrors into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Convert to Result - Ok if no errors, Err if there are errors
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Get errors as a slice
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Render every error as a detail line (see [`ValidationError::detail`])
    pub fn details(&self) -> Vec<String> {
        self.errors.iter().map(ValidationError::detail).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Single Validation Error
// ============================================================================

/// A single validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path segments from the root of the value to the failing field.
    /// List items are recorded by index (e.g. `["items", "0", "id"]`).
    pub path: Vec<String>,

    /// Human-readable error message
    pub message: String,

    /// Error type classification
    pub error_type: ErrorType,
}

impl ValidationError {
    pub fn new(path: Vec<String>, message: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            path,
            message: message.into(),
            error_type,
        }
    }

    pub fn type_error(path: Vec<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, ErrorType::TypeError)
    }

    pub fn value_error(path: Vec<String>, message: impl Into<String>) -> Self {
        Self::new(path, message, ErrorType::ValueError)
    }

    pub fn missing_error(path: Vec<String>) -> Self {
        Self::new(path, "Field required", ErrorType::Missing)
    }

    /// Error for input that is not well-formed JSON at all
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(Vec::new(), message, ErrorType::JsonInvalid)
    }

    /// Dotted field path (`items.0.id`), empty for the root value
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    /// Detail line: `"<message>: <dotted.path>"`, or the bare message at the root
    pub fn detail(&self) -> String {
        if self.path.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.message, self.dotted_path())
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.detail(), self.error_type)
    }
}

// ============================================================================
// Error Type Classification
// ============================================================================

/// Classification of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Type mismatch error (e.g., expected string, got integer)
    TypeError,

    /// Value constraint violation (e.g., string too long, number out of range)
    ValueError,

    /// Required field missing
    Missing,

    /// Invalid format (e.g., invalid email, malformed UUID)
    FormatError,

    /// Input is not parseable JSON
    JsonInvalid,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeError => write!(f, "type_error"),
            Self::ValueError => write!(f, "value_error"),
            Self::Missing => write!(f, "missing"),
            Self::FormatError => write!(f, "format_error"),
            Self::JsonInvalid => write!(f, "json_invalid"),
        }
    }
}

// ============================================================================
// Validation Context
// ============================================================================

/// Tracks the current field path while descending into nested values
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub path: Vec<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Push a field name (or list index) onto the path
    pub fn push(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Snapshot of the current path, for attaching to an error
    pub fn current(&self) -> Vec<String> {
        self.path.clone()
    }

    /// Get the current path as a string (e.g., "user.address")
    pub fn current_path(&self) -> String {
        self.path.join(".")
    }
}
