//! Declared parameter and model types
//!
//! Handlers describe their parameters with [`TypeRef`] values instead of
//! relying on runtime introspection. The [`located`] helpers attach an
//! explicit request location (and optionally a wire name) to a type.

use crate::openapi::Schema;
use crate::parameter::ParameterLocation;
use ferrule_common::http::HttpStatus;
use ferrule_validation::TypeDescriptor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kinds a parameter can be coerced into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
    Date,
    DateTime,
    Time,
    Uuid,
    /// Application-defined scalar, coerced by a registered function
    Custom(String),
}

impl ScalarKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Uuid => "uuid",
            Self::Custom(name) => name,
        }
    }

    /// Documentation schema for this scalar
    pub fn schema(&self) -> Schema {
        match self {
            Self::Bool => Schema::boolean(),
            Self::Int => Schema::integer(),
            Self::Float => Schema::number(),
            Self::String | Self::Custom(_) => Schema::string(),
            Self::Date => Schema::string().format("date"),
            Self::DateTime => Schema::string().format("date-time"),
            Self::Time => Schema::string().format("time"),
            Self::Uuid => Schema::string().format("uuid"),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-model response settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Status used when the model is returned from a handler
    pub status_code: u16,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            status_code: HttpStatus::OK.code(),
        }
    }
}

/// A named data shape used for bodies, structured parameters and responses.
///
/// Serde renames on the implementing type play the role of field aliases and
/// must agree with the aliases in [`StructuredModel::type_descriptor`].
pub trait StructuredModel: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Schema name, also the key for docstring return descriptions
    fn name() -> &'static str {
        short_type_name::<Self>()
    }

    fn type_descriptor() -> TypeDescriptor;

    fn config() -> ModelConfig {
        ModelConfig::default()
    }
}

/// Last path segment of a Rust type name (`app::models::User` -> `User`)
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Erased handle to a [`StructuredModel`]
#[derive(Clone)]
pub struct ModelRef {
    pub name: &'static str,
    pub descriptor: TypeDescriptor,
    pub config: ModelConfig,
    check: fn(&serde_json::Value) -> Result<(), String>,
}

impl ModelRef {
    pub fn of<T: StructuredModel>() -> Self {
        Self {
            name: T::name(),
            descriptor: T::type_descriptor(),
            config: T::config(),
            check: check_model::<T>,
        }
    }

    /// Confirm a structurally valid document also deserializes into the model
    pub fn check(&self, document: &serde_json::Value) -> Result<(), String> {
        (self.check)(document)
    }

    pub fn schema_ref(&self) -> Schema {
        Schema::component(self.name)
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish()
    }
}

fn check_model<T: StructuredModel>(document: &serde_json::Value) -> Result<(), String> {
    T::deserialize(document).map(|_| ()).map_err(|e| e.to_string())
}

/// Declared type of a handler parameter
#[derive(Debug, Clone)]
pub enum TypeRef {
    Scalar(ScalarKind),
    Model(ModelRef),
    Null,
    Union(Vec<TypeRef>),
    /// Type with an explicit request location
    Located {
        inner: Box<TypeRef>,
        location: ParameterLocation,
        wire_name: Option<String>,
    },
}

impl TypeRef {
    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Self::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Self {
        Self::Scalar(ScalarKind::String)
    }

    pub fn date() -> Self {
        Self::Scalar(ScalarKind::Date)
    }

    pub fn datetime() -> Self {
        Self::Scalar(ScalarKind::DateTime)
    }

    pub fn time() -> Self {
        Self::Scalar(ScalarKind::Time)
    }

    pub fn uuid() -> Self {
        Self::Scalar(ScalarKind::Uuid)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Scalar(ScalarKind::Custom(name.into()))
    }

    pub fn model<T: StructuredModel>() -> Self {
        Self::Model(ModelRef::of::<T>())
    }

    /// `self | null`
    pub fn nullable(self) -> Self {
        Self::Union(vec![self, Self::Null])
    }

    /// Override the wire name of a located type. Other types are returned unchanged.
    pub fn alias(self, name: impl Into<String>) -> Self {
        match self {
            Self::Located { inner, location, .. } => Self::Located {
                inner,
                location,
                wire_name: Some(name.into()),
            },
            other => other,
        }
    }

    /// Short description used in registration errors
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Model(model) => model.name.to_string(),
            Self::Null => "null".to_string(),
            Self::Union(alternatives) => alternatives
                .iter()
                .map(TypeRef::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Located { inner, location, .. } => format!("{}[{}]", location, inner.describe()),
        }
    }
}

/// Explicit location wrappers
pub mod located {
    use super::TypeRef;
    use crate::parameter::ParameterLocation;

    fn wrap(ty: TypeRef, location: ParameterLocation) -> TypeRef {
        TypeRef::Located {
            inner: Box::new(ty),
            location,
            wire_name: None,
        }
    }

    pub fn path(ty: TypeRef) -> TypeRef {
        wrap(ty, ParameterLocation::Path)
    }

    pub fn query(ty: TypeRef) -> TypeRef {
        wrap(ty, ParameterLocation::Query)
    }

    /// Header parameter; the wire name defaults to the Capitalized-Hyphen form of the binding name
    pub fn header(ty: TypeRef) -> TypeRef {
        wrap(ty, ParameterLocation::Header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Sample {
        id: i64,
    }

    impl StructuredModel for Sample {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::object(
                "Sample",
                vec![ferrule_validation::FieldDescriptor::new("id", TypeDescriptor::int())],
            )
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(Sample::name(), "Sample");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }

    #[test]
    fn test_model_ref_check() {
        let model = ModelRef::of::<Sample>();
        assert_eq!(model.config.status_code, 200);
        assert!(model.check(&serde_json::json!({"id": 1})).is_ok());
        assert!(model.check(&serde_json::json!({"id": "x"})).is_err());
        assert_eq!(model.schema_ref().reference.as_deref(), Some("#/components/schemas/Sample"));
    }

    #[test]
    fn test_alias_only_applies_to_located() {
        let ty = located::header(TypeRef::string()).alias("X-Lang");
        match ty {
            TypeRef::Located { wire_name, location, .. } => {
                assert_eq!(wire_name.as_deref(), Some("X-Lang"));
                assert_eq!(location, ParameterLocation::Header);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(TypeRef::int().alias("x"), TypeRef::Scalar(ScalarKind::Int)));
    }

    #[test]
    fn test_describe() {
        assert_eq!(TypeRef::int().nullable().describe(), "int | null");
        assert_eq!(located::query(TypeRef::date()).describe(), "query[date]");
    }

    #[test]
    fn test_scalar_schemas() {
        assert_eq!(ScalarKind::DateTime.schema().format.as_deref(), Some("date-time"));
        assert_eq!(ScalarKind::Custom("color".into()).schema().schema_type.as_deref(), Some("string"));
        assert_eq!(ScalarKind::Float.schema().schema_type.as_deref(), Some("number"));
    }
}
