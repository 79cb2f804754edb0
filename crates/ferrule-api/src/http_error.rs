//! Error responses raised from handler logic
//!
//! An [`HttpError`] returned by user logic short-circuits dispatch and is
//! serialized with its own status code and body.

use crate::error::ApiError;
use crate::openapi::Schema;
use crate::parameter::ParameterValidationError;
use crate::response::{Response, APPLICATION_JSON};
use ferrule_common::http::HttpStatus;
use std::collections::BTreeMap;
use thiserror::Error;

/// A declared error kind: status code, default message and body schema
pub trait ErrorResponse {
    const STATUS_CODE: u16;
    const MESSAGE: &'static str;

    fn name() -> &'static str;

    /// Body schema: `{"message": string}` defaulting to [`Self::MESSAGE`]
    fn schema() -> Schema {
        let mut properties = BTreeMap::new();
        properties.insert(
            "message".to_string(),
            Schema::string().default_value(serde_json::Value::from(Self::MESSAGE)),
        );
        let mut schema = Schema::object().title(Self::name());
        schema.properties = Some(properties);
        schema
    }
}

macro_rules! error_responses {
    ($($ty:ident => $status:ident, $message:literal;)*) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $ty;

            impl ErrorResponse for $ty {
                const STATUS_CODE: u16 = HttpStatus::$status.code();
                const MESSAGE: &'static str = $message;

                fn name() -> &'static str {
                    stringify!($ty)
                }
            }

            impl From<$ty> for HttpError {
                fn from(_: $ty) -> Self {
                    HttpError::new::<$ty>()
                }
            }
        )*
    };
}

error_responses! {
    BadRequestError => BAD_REQUEST, "Bad request";
    NotFoundError => NOT_FOUND, "Not found";
    MethodNotAllowedError => METHOD_NOT_ALLOWED, "Method not allowed";
    ConflictError => CONFLICT, "Conflict";
    UnsupportedMediaTypeError => UNSUPPORTED_MEDIA_TYPE, "Unsupported media type";
    UnprocessableContentError => UNPROCESSABLE_ENTITY, "Unprocessable content";
    TooManyRequestsError => TOO_MANY_REQUESTS, "Too many requests";
    InternalServerError => INTERNAL_SERVER_ERROR, "Internal server error";
}

/// Error value returned by handler logic
#[derive(Debug, Clone, Error)]
#[error("{name} ({status_code})")]
pub struct HttpError {
    pub name: String,
    pub status_code: u16,
    pub mime_type: String,
    pub body: serde_json::Value,
}

impl HttpError {
    /// Error of kind `E` with its default message
    pub fn new<E: ErrorResponse>() -> Self {
        Self {
            name: E::name().to_string(),
            status_code: E::STATUS_CODE,
            mime_type: APPLICATION_JSON.to_string(),
            body: serde_json::json!({ "message": E::MESSAGE }),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.body = serde_json::json!({ "message": message.into() });
        self
    }

    /// Replace the whole JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Aggregate 422 listing every failed parameter
    pub fn validation(errors: &[ParameterValidationError]) -> Self {
        Self {
            name: "ValidationError".to_string(),
            status_code: HttpStatus::UNPROCESSABLE_ENTITY.code(),
            mime_type: APPLICATION_JSON.to_string(),
            body: serde_json::json!({ "errors": errors }),
        }
    }

    pub fn into_response(self) -> Response {
        Response::new(self.status_code, self.mime_type, self.body.to_string())
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self {
            name: "ApiError".to_string(),
            status_code: err.status_code(),
            mime_type: APPLICATION_JSON.to_string(),
            body: serde_json::json!({ "message": err.to_string() }),
        }
    }
}

/// Documentation handle for an error kind a handler may produce
#[derive(Debug, Clone)]
pub struct ErrorRef {
    pub name: &'static str,
    pub status_code: u16,
    schema: fn() -> Schema,
}

impl ErrorRef {
    pub fn of<E: ErrorResponse>() -> Self {
        Self {
            name: E::name(),
            status_code: E::STATUS_CODE,
            schema: E::schema,
        }
    }

    /// Document this error under a different status code
    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn schema(&self) -> Schema {
        (self.schema)()
    }
}
