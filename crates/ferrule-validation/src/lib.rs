//! Ferrule Validation
//!
//! Structural validation used by `ferrule-api` for request bodies and
//! structured parameters, and as the source of documentation schemas.
//!
//! # Features
//!
//! - **Default**: Core validation over the [`Value`] tree
//! - **serde**: `serde_json` interop and [`validate_json`]
//!
//! # Example
//!
//! ```rust
//! use ferrule_validation::{TypeDescriptor, Value, validate};
//!
//! let email_type = TypeDescriptor::Email;
//!
//! let value = Value::String("user@example.com".to_string());
//! assert!(validate(&value, &email_type).is_ok());
//!
//! let invalid = Value::String("not-an-email".to_string());
//! assert!(validate(&invalid, &email_type).is_err());
//! ```

pub mod constraints;
pub mod errors;
pub mod formats;
pub mod types;
pub mod validators;

pub use constraints::{
    FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints, StringFormat,
};
pub use errors::{ErrorType, ValidationContext, ValidationError, ValidationErrors, ValidationResult};
pub use types::{TypeDescriptor, Value};
pub use validators::{validate, validate_value, validate_with_context};

#[cfg(feature = "serde")]
pub use validators::validate_json;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
