//! Resources and path templates
//!
//! A [`TypedResource`] groups handlers under one path. Binding it produces a
//! shared [`PathTemplate`] and one [`HandlerContract`] per declared verb.

use crate::contract::HandlerContract;
use crate::error::RegistrationError;
use crate::handler::Handler;
use crate::openapi::PathItem;
use crate::types::short_type_name;
use ferrule_common::http::HttpMethod;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

static PATH_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:(?P<converter>[A-Za-z_]\w*):)?(?P<name>[A-Za-z_]\w*)>").unwrap());

/// Path with `<[converter:]name>` tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pub path: String,
    /// Tokens in order, with their converter hint
    pub parameters: Vec<(String, Option<String>)>,
    /// `{name}` form used in documentation
    pub openapi_path: String,
    /// `:name` form used by the router (`*name` for the `path` converter)
    pub route_path: String,
}

impl PathTemplate {
    pub fn parse(path: &str) -> Self {
        let parameters = PATH_TOKEN_RE
            .captures_iter(path)
            .map(|caps| {
                (
                    caps["name"].to_string(),
                    caps.name("converter").map(|m| m.as_str().to_string()),
                )
            })
            .collect();
        let openapi_path = PATH_TOKEN_RE.replace_all(path, "{${name}}").into_owned();
        let route_path = PATH_TOKEN_RE
            .replace_all(path, |caps: &regex::Captures<'_>| {
                match caps.name("converter").map(|m| m.as_str()) {
                    Some("path") => format!("*{}", &caps["name"]),
                    _ => format!(":{}", &caps["name"]),
                }
            })
            .into_owned();

        Self {
            path: path.to_string(),
            parameters,
            openapi_path,
            route_path,
        }
    }

    pub fn parameter_names(&self) -> HashSet<String> {
        self.parameters.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn converter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(token, _)| token == name)
            .and_then(|(_, converter)| converter.as_deref())
    }
}

/// A group of handlers bound to one path.
///
/// A fresh instance is created with `Default` for every dispatched request.
pub trait TypedResource: Default + Send + Sync + 'static {
    fn methods(methods: &mut Methods<Self>);

    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

/// Per-verb handler slots filled by [`TypedResource::methods`]
pub struct Methods<R> {
    slots: Vec<(HttpMethod, Handler<R>)>,
}

impl<R> Default for Methods<R> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<R> Methods<R> {
    fn set(&mut self, method: HttpMethod, handler: Handler<R>) -> &mut Self {
        self.slots.retain(|(existing, _)| *existing != method);
        self.slots.push((method, handler));
        self
    }

    pub fn get(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Get, handler)
    }

    pub fn post(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Post, handler)
    }

    pub fn put(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Put, handler)
    }

    pub fn patch(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Patch, handler)
    }

    pub fn delete(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Delete, handler)
    }

    pub fn head(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Head, handler)
    }

    pub fn options(&mut self, handler: Handler<R>) -> &mut Self {
        self.set(HttpMethod::Options, handler)
    }

    fn take(&mut self, method: HttpMethod) -> Option<Handler<R>> {
        let position = self.slots.iter().position(|(existing, _)| *existing == method)?;
        Some(self.slots.remove(position).1)
    }
}

/// A resource bound to a path: one contract per declared verb
#[derive(Debug)]
pub struct BoundResource {
    pub name: &'static str,
    pub path: Arc<PathTemplate>,
    contracts: Vec<HandlerContract>,
}

impl BoundResource {
    pub fn bind<R: TypedResource>(path: &str) -> Result<Self, RegistrationError> {
        let template = Arc::new(PathTemplate::parse(path));
        let mut methods = Methods::<R>::default();
        R::methods(&mut methods);

        let mut contracts = Vec::new();
        for method in HttpMethod::ALL {
            if let Some(handler) = methods.take(method) {
                contracts.push(HandlerContract::build(method, Arc::clone(&template), handler)?);
            }
        }

        debug!(resource = R::name(), path = %template.path, verbs = contracts.len(), "bound resource");

        Ok(Self {
            name: R::name(),
            path: template,
            contracts,
        })
    }

    pub fn contract(&self, method: HttpMethod) -> Option<&HandlerContract> {
        self.contracts.iter().find(|contract| contract.method == method)
    }

    pub fn contracts(&self) -> &[HandlerContract] {
        &self.contracts
    }

    pub fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.contracts.iter().map(|contract| contract.method).collect()
    }

    pub fn generate_path_item(&self) -> PathItem {
        let mut item = PathItem::default();
        for contract in &self.contracts {
            item.set(contract.method, contract.generate_operation());
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Param;
    use crate::reply::Reply;
    use crate::responses::ResponseType;
    use crate::types::TypeRef;

    #[test]
    fn test_path_template() {
        let template = PathTemplate::parse("/jobs/<int:job_id>/<string:job_date>");
        assert_eq!(template.openapi_path, "/jobs/{job_id}/{job_date}");
        assert_eq!(template.route_path, "/jobs/:job_id/:job_date");
        assert_eq!(
            template.parameter_names(),
            HashSet::from(["job_id".to_string(), "job_date".to_string()])
        );
        assert_eq!(template.converter("job_id"), Some("int"));
    }

    #[test]
    fn test_path_template_without_converter() {
        let template = PathTemplate::parse("/files/<name>/<path:rest>");
        assert_eq!(template.openapi_path, "/files/{name}/{rest}");
        assert_eq!(template.route_path, "/files/:name/*rest");
        assert_eq!(template.converter("name"), None);

        let plain = PathTemplate::parse("/users");
        assert!(plain.parameters.is_empty());
        assert_eq!(plain.route_path, "/users");
    }

    #[derive(Default)]
    struct Ping;

    impl TypedResource for Ping {
        fn methods(methods: &mut Methods<Self>) {
            methods
                .post(Handler::new(|_, _| Ok(Reply::NoContent)).returns(ResponseType::NoContent))
                .get(
                    Handler::new(|_, _| Ok(Reply::NoContent))
                        .param(Param::new("id", TypeRef::int()))
                        .returns(ResponseType::NoContent),
                );
        }
    }

    #[test]
    fn test_bind_visits_verbs_in_order() {
        let bound = BoundResource::bind::<Ping>("/ping/<int:id>").unwrap();
        assert_eq!(bound.name, "Ping");
        assert_eq!(bound.allowed_methods(), vec![HttpMethod::Get, HttpMethod::Post]);

        let get = bound.contract(HttpMethod::Get).unwrap();
        assert!(Arc::ptr_eq(&get.path, &bound.path));
        assert_eq!(get.parameters[0].location, crate::parameter::ParameterLocation::Path);

        let item = bound.generate_path_item();
        assert!(item.get.is_some());
        assert!(item.post.is_some());
        assert!(item.put.is_none());
    }

    #[derive(Default)]
    struct Untyped;

    impl TypedResource for Untyped {
        fn methods(methods: &mut Methods<Self>) {
            methods.get(
                Handler::new(|_, _| Ok(Reply::NoContent))
                    .param(Param::untyped("q"))
                    .returns(ResponseType::NoContent),
            );
        }
    }

    #[test]
    fn test_bind_propagates_registration_errors() {
        let err = BoundResource::bind::<Untyped>("/untyped").unwrap_err();
        assert_eq!(
            err,
            RegistrationError::MissingTypeAnnotation {
                parameter: "q".to_string()
            }
        );
    }
}
