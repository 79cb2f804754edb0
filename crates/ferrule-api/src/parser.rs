//! Request parsers
//!
//! A parser reads a whole request area (the query map, the header map or the
//! body) into its own type, and documents itself.

use crate::arguments::ArgValue;
use crate::openapi::{Parameter, RequestBody};
use crate::parameter::{ParameterLocation, ParameterValidationError};
use crate::request::Request;
use std::fmt;
use std::sync::Arc;

pub trait RequestParser: Sized + Send + Sync + 'static {
    /// Request area this parser reads (`Query`, `Header` or `Body`)
    const LOCATION: ParameterLocation;

    /// Parse the request, or return the detail strings describing every failure
    fn parse(request: &Request) -> Result<Self, Vec<String>>;

    /// Documented query/header parameters
    fn parameters() -> Vec<Parameter> {
        Vec::new()
    }

    /// Documented request body
    fn request_body() -> Option<RequestBody> {
        None
    }
}

/// Type-erased parser bound to a handler argument
#[derive(Clone)]
pub struct ParserSpec {
    pub name: String,
    pub location: ParameterLocation,
    parse: fn(&Request) -> Result<ArgValue, Vec<String>>,
    parameters: fn() -> Vec<Parameter>,
    request_body: fn() -> Option<RequestBody>,
}

impl ParserSpec {
    pub fn of<P: RequestParser>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: P::LOCATION,
            parse: erase::<P>,
            parameters: P::parameters,
            request_body: P::request_body,
        }
    }

    pub fn validate(&self, request: &Request) -> Result<ArgValue, ParameterValidationError> {
        (self.parse)(request)
            .map_err(|details| ParameterValidationError::new(self.name.clone(), self.location, details))
    }

    pub fn openapi_parameters(&self) -> Vec<Parameter> {
        (self.parameters)()
    }

    pub fn request_body(&self) -> Option<RequestBody> {
        (self.request_body)()
    }
}

impl fmt::Debug for ParserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserSpec")
            .field("name", &self.name)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

fn erase<P: RequestParser>(request: &Request) -> Result<ArgValue, Vec<String>> {
    P::parse(request).map(|parsed| ArgValue::Parsed(Arc::new(parsed)))
}
