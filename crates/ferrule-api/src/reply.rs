//! Handler return values and custom response types

use crate::http_error::{HttpError, InternalServerError};
use crate::response::{Response, APPLICATION_JSON};
use crate::types::{short_type_name, StructuredModel};
use ferrule_common::http::HttpStatus;
use std::fmt;

/// A response type that serializes itself and supplies its own schema
pub trait CustomResponse: Send + 'static {
    const STATUS_CODE: u16 = HttpStatus::OK.code();
    const MIME_TYPE: &'static str;

    fn name() -> &'static str {
        short_type_name::<Self>()
    }

    /// OpenAPI schema object for the body
    fn schema() -> serde_json::Value;

    fn into_response(self) -> Response;
}

/// Documentation handle for a [`CustomResponse`]
#[derive(Clone)]
pub struct CustomResponseRef {
    pub name: &'static str,
    pub status_code: u16,
    pub mime_type: &'static str,
    schema: fn() -> serde_json::Value,
}

impl CustomResponseRef {
    pub fn of<C: CustomResponse>() -> Self {
        Self {
            name: C::name(),
            status_code: C::STATUS_CODE,
            mime_type: C::MIME_TYPE,
            schema: C::schema,
        }
    }

    pub fn raw_schema(&self) -> serde_json::Value {
        (self.schema)()
    }
}

impl fmt::Debug for CustomResponseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResponseRef")
            .field("name", &self.name)
            .field("status_code", &self.status_code)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// Successful handler result
#[derive(Debug, Clone)]
pub enum Reply {
    /// Serialized structured model
    Model { body: serde_json::Value, status: u16 },
    /// Response produced by a [`CustomResponse`]
    Custom(Response),
    /// Low-level response passed through untouched
    Raw(Response),
    NoContent,
}

impl Reply {
    /// Serialize a model with its configured status code
    pub fn model<T: StructuredModel>(value: &T) -> Result<Self, HttpError> {
        let body = serde_json::to_value(value).map_err(|e| {
            tracing::error!(model = T::name(), error = %e, "failed to serialize response model");
            HttpError::new::<InternalServerError>()
        })?;
        Ok(Self::Model {
            body,
            status: T::config().status_code,
        })
    }

    pub fn custom<C: CustomResponse>(value: C) -> Self {
        Self::Custom(value.into_response())
    }

    pub fn raw(response: Response) -> Self {
        Self::Raw(response)
    }

    /// Raw JSON body with status 200
    pub fn json(value: serde_json::Value) -> Self {
        Self::Raw(Response::json_value(HttpStatus::OK.code(), &value))
    }

    pub fn into_response(self) -> Response {
        match self {
            Self::Model { body, status } => Response::new(status, APPLICATION_JSON, body.to_string()),
            Self::Custom(response) | Self::Raw(response) => response,
            Self::NoContent => Response::no_content(),
        }
    }
}
