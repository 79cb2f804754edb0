//! API framework error types

use ferrule_common::http::HttpStatus;
use thiserror::Error;

/// API framework result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Runtime failures that are not domain errors raised by handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Cannot extract argument '{name}': {reason}")]
    Extraction { name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        let status = match self {
            ApiError::BadRequest(_) => HttpStatus::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => HttpStatus::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed(_) => HttpStatus::METHOD_NOT_ALLOWED,
            ApiError::MissingArgument(_)
            | ApiError::Extraction { .. }
            | ApiError::Serialization(_)
            | ApiError::Internal(_) => HttpStatus::INTERNAL_SERVER_ERROR,
        };
        status.code()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

/// Errors raised while binding resources and building handler contracts.
///
/// These abort startup; they are never returned to clients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("No type annotation is provided for parameter: {parameter}")]
    MissingTypeAnnotation { parameter: String },

    #[error("Multiple argument types are provided for parameter '{parameter}': {}", .alternatives.join(" | "))]
    AmbiguousType {
        parameter: String,
        alternatives: Vec<String>,
    },

    #[error("Unsupported type for parameter '{parameter}': {ty}")]
    UnsupportedParameterType { parameter: String, ty: String },

    #[error("Parameter '{parameter}' cannot be explicitly located in the body")]
    InvalidBodyLocation { parameter: String },

    #[error("Response type {response} does not produce a valid schema: {reason}")]
    InvalidResponseSchema { response: String, reason: String },

    #[error("Handler {handler} declares no success response")]
    NoSuccessResponse { handler: String },

    #[error("Schema name '{name}' is already registered for a different model")]
    SchemaNameConflict { name: String },

    #[error("URL is already registered: {0}")]
    DuplicatePath(String),

    #[error("Cannot route {path}: {reason}")]
    RouteConflict { path: String, reason: String },
}
