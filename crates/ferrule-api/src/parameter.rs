//! Parameter classification and validation
//!
//! [`ParameterSpec::classify`] decides where a declared parameter comes from
//! and under which wire name. [`ParameterSpec::validate`] turns the raw wire
//! value into an [`ArgValue`] or a [`ParameterValidationError`].

use crate::arguments::ArgValue;
use crate::coercion::Coercions;
use crate::error::RegistrationError;
use crate::openapi::{type_descriptor_to_schema, Parameter, ParameterIn, RequestBody};
use crate::request::Request;
use crate::types::{ModelRef, ScalarKind, TypeRef};
use ferrule_common::http::HttpRequestLike;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Where a parameter value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        }
    }

    /// OpenAPI parameter location; bodies are documented as a request body instead
    pub fn to_openapi(&self) -> Option<ParameterIn> {
        match self {
            Self::Path => Some(ParameterIn::Path),
            Self::Query => Some(ParameterIn::Query),
            Self::Header => Some(ParameterIn::Header),
            Self::Body => None,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unwrapped parameter type (nullability removed)
#[derive(Debug, Clone)]
pub enum ParamType {
    Scalar(ScalarKind),
    Model(ModelRef),
}

/// One failed parameter, as reported in the 422 body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterValidationError {
    /// Wire name of the parameter
    pub parameter: String,
    pub location: ParameterLocation,
    pub details: Vec<String>,
}

impl ParameterValidationError {
    pub fn new(parameter: impl Into<String>, location: ParameterLocation, details: Vec<String>) -> Self {
        Self {
            parameter: parameter.into(),
            location,
            details,
        }
    }
}

impl fmt::Display for ParameterValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parameter '{}': {}", self.location, self.parameter, self.details.join("; "))
    }
}

impl std::error::Error for ParameterValidationError {}

/// `accept_language` -> `Accept-Language`
pub fn header_name(name: &str) -> String {
    name.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Classified handler parameter
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Binding name used in [`Arguments`](crate::Arguments)
    pub name: String,
    /// Wire name used to read the raw value
    pub source: String,
    pub location: ParameterLocation,
    pub param_type: ParamType,
    /// True iff a default was declared
    pub is_optional: bool,
    pub default: Option<ArgValue>,
    pub description: Option<String>,
}

impl ParameterSpec {
    /// Classify a declared parameter.
    ///
    /// Explicit location wins, then structured types go to the body, then
    /// names matching a path token go to the path, then the query.
    pub fn classify(
        name: &str,
        declared: Option<&TypeRef>,
        default: Option<ArgValue>,
        path_names: &HashSet<String>,
    ) -> Result<Self, RegistrationError> {
        let declared = declared.ok_or_else(|| RegistrationError::MissingTypeAnnotation {
            parameter: name.to_string(),
        })?;

        let (location, param_type, source) = match declared {
            TypeRef::Located {
                inner,
                location,
                wire_name,
            } => {
                if *location == ParameterLocation::Body {
                    return Err(RegistrationError::InvalidBodyLocation {
                        parameter: name.to_string(),
                    });
                }
                let param_type = unwrap_nullable(name, inner)?;
                let source = match (wire_name, location) {
                    (Some(wire_name), _) => wire_name.clone(),
                    (None, ParameterLocation::Header) => header_name(name),
                    (None, _) => name.to_string(),
                };
                (*location, param_type, source)
            }
            other => {
                let param_type = unwrap_nullable(name, other)?;
                let location = match param_type {
                    ParamType::Model(_) => ParameterLocation::Body,
                    ParamType::Scalar(_) if path_names.contains(name) => ParameterLocation::Path,
                    ParamType::Scalar(_) => ParameterLocation::Query,
                };
                (location, param_type, name.to_string())
            }
        };

        if location == ParameterLocation::Path && matches!(param_type, ParamType::Model(_)) {
            return Err(RegistrationError::UnsupportedParameterType {
                parameter: name.to_string(),
                ty: declared.describe(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            source,
            location,
            param_type,
            is_optional: default.is_some(),
            default,
            description: None,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    fn raw_value<'a>(&self, request: &'a Request) -> Option<&'a [u8]> {
        match self.location {
            ParameterLocation::Path => request.path_param(&self.source).map(str::as_bytes),
            ParameterLocation::Query => request.query_param(&self.source).map(str::as_bytes),
            ParameterLocation::Header => request.header(&self.source).map(str::as_bytes),
            ParameterLocation::Body => request.body(),
        }
    }

    /// Validate this parameter against a request
    pub fn validate(
        &self,
        request: &Request,
        coercions: &Coercions,
    ) -> Result<ArgValue, ParameterValidationError> {
        let Some(raw) = self.raw_value(request) else {
            return match &self.default {
                Some(default) => Ok(default.clone()),
                None => Err(self.error(vec!["Parameter is not optional".to_string()])),
            };
        };

        match &self.param_type {
            ParamType::Model(model) => {
                let document = ferrule_validation::validate_json(raw, &model.descriptor)
                    .map_err(|errors| self.error(errors.details()))?;
                model
                    .check(&document)
                    .map_err(|reason| self.error(vec![reason]))?;
                Ok(ArgValue::Json(document))
            }
            ParamType::Scalar(kind) => {
                let text = std::str::from_utf8(raw)
                    .map_err(|e| self.error(vec![format!("invalid UTF-8: {}", e)]))?;
                coercions
                    .coerce(kind, text)
                    .map_err(|detail| self.error(vec![detail]))
            }
        }
    }

    fn error(&self, details: Vec<String>) -> ParameterValidationError {
        ParameterValidationError::new(self.source.clone(), self.location, details)
    }

    /// OpenAPI parameter entries; empty for body parameters
    pub fn openapi_parameters(&self) -> Vec<Parameter> {
        let Some(location) = self.location.to_openapi() else {
            return Vec::new();
        };
        let required = !self.is_optional;

        match &self.param_type {
            ParamType::Scalar(kind) => {
                let mut schema = kind.schema();
                if let Some(default) = self.default.as_ref().and_then(ArgValue::to_json) {
                    if !default.is_null() {
                        schema.default = Some(default);
                    }
                }
                let mut parameter = Parameter::new(&self.source, location, schema).required(required);
                if let Some(description) = &self.description {
                    parameter = parameter.description(description);
                }
                vec![parameter]
            }
            ParamType::Model(model) => model
                .descriptor
                .fields()
                .unwrap_or_default()
                .iter()
                .map(|field| {
                    let mut parameter =
                        Parameter::new(field.wire_name(), location, type_descriptor_to_schema(&field.type_desc))
                            .required(required && field.required);
                    if let Some(description) = &field.description {
                        parameter = parameter.description(description);
                    }
                    parameter
                })
                .collect(),
        }
    }

    /// Request body entry for a body parameter
    pub fn request_body(&self) -> Option<RequestBody> {
        match (&self.location, &self.param_type) {
            (ParameterLocation::Body, ParamType::Model(model)) => {
                let mut body = RequestBody::json(model.schema_ref(), !self.is_optional);
                body.description = self.description.clone();
                Some(body)
            }
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&ModelRef> {
        match &self.param_type {
            ParamType::Model(model) => Some(model),
            ParamType::Scalar(_) => None,
        }
    }
}

/// Strip `null` alternatives; exactly one non-null alternative must remain
fn unwrap_nullable(name: &str, ty: &TypeRef) -> Result<ParamType, RegistrationError> {
    let mut alternatives = Vec::new();
    flatten(ty, &mut alternatives);

    let unsupported = || RegistrationError::UnsupportedParameterType {
        parameter: name.to_string(),
        ty: ty.describe(),
    };

    match alternatives.as_slice() {
        [] => Err(unsupported()),
        [single] => match single {
            TypeRef::Scalar(kind) => Ok(ParamType::Scalar(kind.clone())),
            TypeRef::Model(model) => Ok(ParamType::Model(model.clone())),
            _ => Err(unsupported()),
        },
        many => Err(RegistrationError::AmbiguousType {
            parameter: name.to_string(),
            alternatives: many.iter().map(|alt| alt.describe()).collect(),
        }),
    }
}

fn flatten<'a>(ty: &'a TypeRef, out: &mut Vec<&'a TypeRef>) {
    match ty {
        TypeRef::Union(members) => members.iter().for_each(|member| flatten(member, out)),
        TypeRef::Null => {}
        other => out.push(other),
    }
}
