//! Handler contracts
//!
//! A [`HandlerContract`] is built once per (path, verb) and is immutable
//! afterwards. Dispatch validates every parameter, collects all failures,
//! and only then either rejects with a 422 or runs the user logic.

use crate::arguments::Arguments;
use crate::coercion::Coercions;
use crate::docs::Docstring;
use crate::error::RegistrationError;
use crate::handler::{Handler, HandlerArg};
use crate::http_error::HttpError;
use crate::openapi::Operation;
use crate::parameter::{ParameterSpec, ParameterValidationError};
use crate::parser::ParserSpec;
use crate::reply::Reply;
use crate::request::Request;
use crate::resource::{PathTemplate, TypedResource};
use crate::response::Response;
use crate::responses::{resolve, ResolvedResponses, ResponseType};
use crate::types::ModelRef;
use ferrule_common::http::HttpMethod;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type ErasedLogic = Arc<dyn Fn(&Arguments) -> Result<Reply, HttpError> + Send + Sync>;

pub struct HandlerContract {
    pub method: HttpMethod,
    pub resource: &'static str,
    pub path: Arc<PathTemplate>,
    pub parameters: Vec<ParameterSpec>,
    pub parsers: Vec<ParserSpec>,
    pub responses: ResolvedResponses,
    pub docstring: Option<Docstring>,
    models: Vec<ModelRef>,
    logic: ErasedLogic,
}

impl HandlerContract {
    /// Classify parameters and resolve responses for one handler
    pub fn build<R: TypedResource>(
        method: HttpMethod,
        path: Arc<PathTemplate>,
        handler: Handler<R>,
    ) -> Result<Self, RegistrationError> {
        let resource = R::name();
        let handler_name = format!("{}.{}", resource, method.as_lower());
        let docstring = handler.doc.as_deref().map(Docstring::parse);
        let path_names = path.parameter_names();

        let mut parameters = Vec::new();
        let mut parsers = Vec::new();
        for arg in handler.args {
            match arg {
                HandlerArg::Param(param) => {
                    let description = docstring
                        .as_ref()
                        .and_then(|doc| doc.parameter_description(&param.name))
                        .map(str::to_string);
                    let spec = ParameterSpec::classify(&param.name, param.ty.as_ref(), param.default, &path_names)?
                        .with_description(description);
                    parameters.push(spec);
                }
                HandlerArg::Parser(parser) => parsers.push(parser),
            }
        }

        let responses = resolve(&handler.returns, &handler.raises, docstring.as_ref(), &handler_name)?;

        let mut models: Vec<ModelRef> = parameters.iter().filter_map(|p| p.model().cloned()).collect();
        models.extend(handler.returns.iter().filter_map(|member| match member {
            ResponseType::Model(model) => Some(model.clone()),
            _ => None,
        }));

        debug!(
            handler = %handler_name,
            path = %path.path,
            parameters = parameters.len(),
            parsers = parsers.len(),
            "built handler contract"
        );

        let logic = handler.logic;
        let logic: ErasedLogic = Arc::new(move |args: &Arguments| {
            let instance = R::default();
            logic(&instance, args)
        });

        Ok(Self {
            method,
            resource,
            path,
            parameters,
            parsers,
            responses,
            docstring,
            models,
            logic,
        })
    }

    /// Validate every parameter and parser, collecting all failures
    pub fn validate(
        &self,
        request: &Request,
        coercions: &Coercions,
    ) -> Result<Arguments, Vec<ParameterValidationError>> {
        let mut arguments = Arguments::new();
        let mut errors = Vec::new();

        for parameter in &self.parameters {
            match parameter.validate(request, coercions) {
                Ok(value) => arguments.insert(parameter.name.clone(), value),
                Err(err) => errors.push(err),
            }
        }
        for parser in &self.parsers {
            match parser.validate(request) {
                Ok(value) => arguments.insert(parser.name.clone(), value),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(arguments)
        } else {
            Err(errors)
        }
    }

    pub fn dispatch(&self, request: &Request, coercions: &Coercions) -> Response {
        let arguments = match self.validate(request, coercions) {
            Ok(arguments) => arguments,
            Err(errors) => {
                debug!(
                    resource = self.resource,
                    method = %self.method,
                    failures = errors.len(),
                    "request rejected"
                );
                return HttpError::validation(&errors).into_response();
            }
        };

        match (self.logic)(&arguments) {
            Ok(reply) => reply.into_response(),
            Err(err) => {
                debug!(resource = self.resource, error = %err, "handler returned error response");
                err.into_response()
            }
        }
    }

    /// OpenAPI operation for this handler
    pub fn generate_operation(&self) -> Operation {
        let mut operation = Operation::new();
        if let Some(doc) = &self.docstring {
            operation.summary = doc.short_description.clone();
            operation.description = doc.long_description.clone();
        }

        for parameter in &self.parameters {
            operation.parameters.extend(parameter.openapi_parameters());
            if let Some(body) = parameter.request_body() {
                operation.request_body = Some(body);
            }
        }
        for parser in &self.parsers {
            operation.parameters.extend(parser.openapi_parameters());
            if let Some(body) = parser.request_body() {
                operation.request_body = Some(body);
            }
        }

        operation.responses = self.responses.to_openapi();
        operation
    }

    /// Structured models referenced by parameters and responses
    pub fn models(&self) -> &[ModelRef] {
        &self.models
    }
}

impl fmt::Debug for HandlerContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContract")
            .field("method", &self.method)
            .field("resource", &self.resource)
            .field("path", &self.path.path)
            .field("parameters", &self.parameters)
            .field("parsers", &self.parsers)
            .field("responses", &self.responses)
            .finish_non_exhaustive()
    }
}
