//! ferrule-api: typed HTTP handlers
//!
//! Handlers declare their parameters and possible responses up front:
//! - every parameter is classified once (path, query, header or body)
//! - requests are validated as a whole and rejected with a single 422
//! - declared responses and errors feed the generated OpenAPI document
//!
//! Resources are mounted on a [`TypedApi`], which routes requests and serves
//! the OpenAPI document and a Redoc viewer.

pub mod api;
pub mod arguments;
pub mod coercion;
pub mod contract;
pub mod docs;
pub mod error;
pub mod handler;
pub mod http_error;
pub mod logging;
pub mod openapi;
pub mod parameter;
pub mod parser;
pub mod reply;
pub mod request;
pub mod resource;
pub mod response;
pub mod responses;
pub mod server;
pub mod types;

// Re-exports
pub use api::{join_path, ApiConfig, TypedApi, TypedBlueprint};
pub use arguments::{ArgValue, Arguments};
pub use coercion::Coercions;
pub use contract::HandlerContract;
pub use docs::Docstring;
pub use error::{ApiError, ApiResult, RegistrationError};
pub use handler::{Handler, Param};
pub use http_error::{
    BadRequestError, ConflictError, ErrorRef, ErrorResponse, HttpError, InternalServerError,
    MethodNotAllowedError, NotFoundError, TooManyRequestsError, UnprocessableContentError,
    UnsupportedMediaTypeError,
};
pub use logging::{init_logging, LogConfig};
pub use openapi::OpenApiSpec;
pub use parameter::{ParameterLocation, ParameterSpec, ParameterValidationError};
pub use parser::RequestParser;
pub use reply::{CustomResponse, CustomResponseRef, Reply};
pub use request::Request;
pub use resource::{BoundResource, Methods, PathTemplate, TypedResource};
pub use response::Response;
pub use responses::{ResolvedResponses, ResponseType};
pub use server::{Server, ServerConfig};
pub use types::{located, ModelConfig, ModelRef, ScalarKind, StructuredModel, TypeRef};

// Re-export shared HTTP types from ferrule-common
pub use ferrule_common::http::{HttpMethod, HttpRequestLike, HttpResponseLike, HttpStatus};

// Model descriptors are declared with the validation crate's types
pub use ferrule_validation::{FieldDescriptor, TypeDescriptor};
