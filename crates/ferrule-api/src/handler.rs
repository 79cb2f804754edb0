//! Handler declarations
//!
//! A [`Handler`] pairs user logic with the table of parameters, parsers,
//! return members and documented errors that replaces signature reflection.

use crate::arguments::{ArgValue, Arguments};
use crate::http_error::{ErrorRef, HttpError};
use crate::parser::{ParserSpec, RequestParser};
use crate::reply::Reply;
use crate::responses::ResponseType;
use crate::types::TypeRef;
use std::fmt;

/// User logic: receives the resource instance and validated arguments
pub type HandlerFn<R> = Box<dyn Fn(&R, &Arguments) -> Result<Reply, HttpError> + Send + Sync>;

/// One declared handler parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeRef>,
    pub default: Option<ArgValue>,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            default: None,
        }
    }

    /// Parameter without a declared type; rejected at registration
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
        }
    }

    /// Declare a default, making the parameter optional
    pub fn default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Handler argument: a classified parameter or a request parser
#[derive(Debug, Clone)]
pub(crate) enum HandlerArg {
    Param(Param),
    Parser(ParserSpec),
}

pub struct Handler<R> {
    pub(crate) logic: HandlerFn<R>,
    pub(crate) doc: Option<String>,
    pub(crate) args: Vec<HandlerArg>,
    pub(crate) returns: Vec<ResponseType>,
    pub(crate) raises: Vec<ErrorRef>,
}

impl<R> Handler<R> {
    pub fn new<F>(logic: F) -> Self
    where
        F: Fn(&R, &Arguments) -> Result<Reply, HttpError> + Send + Sync + 'static,
    {
        Self {
            logic: Box::new(logic),
            doc: None,
            args: Vec::new(),
            returns: Vec::new(),
            raises: Vec::new(),
        }
    }

    /// reST-style documentation text
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(text.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.args.push(HandlerArg::Param(param));
        self
    }

    pub fn parser<P: RequestParser>(mut self, name: impl Into<String>) -> Self {
        self.args.push(HandlerArg::Parser(ParserSpec::of::<P>(name)));
        self
    }

    /// Add a member to the declared return union
    pub fn returns(mut self, response: ResponseType) -> Self {
        self.returns.push(response);
        self
    }

    /// Document an error the handler may produce
    pub fn raises(mut self, error: ErrorRef) -> Self {
        self.raises.push(error);
        self
    }
}

impl<R> fmt::Debug for Handler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("args", &self.args)
            .field("returns", &self.returns)
            .field("raises", &self.raises)
            .finish_non_exhaustive()
    }
}
