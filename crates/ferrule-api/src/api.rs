//! API registry
//!
//! [`TypedApi`] binds resources to paths, routes requests to their handler
//! contracts and serves the OpenAPI document and the Redoc viewer.

use crate::coercion::Coercions;
use crate::docs::redoc_page;
use crate::error::RegistrationError;
use crate::http_error::{HttpError, MethodNotAllowedError, NotFoundError};
use crate::openapi::{type_descriptor_to_schema, OpenApiSpec, Schema};
use crate::request::Request;
use crate::resource::{BoundResource, TypedResource};
use crate::response::Response;
use ferrule_common::http::{HttpMethod, HttpStatus};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::info;

/// API-level settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Title of the OpenAPI document
    pub title: String,
    pub version: String,
    pub openapi_path: String,
    pub docs_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            version: "v0.0.1".to_string(),
            openapi_path: "/openapi".to_string(),
            docs_path: "/docs".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn openapi_path(mut self, path: impl Into<String>) -> Self {
        self.openapi_path = path.into();
        self
    }

    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = path.into();
        self
    }
}

/// `rstrip('/') + '/' + lstrip('/')`
pub fn join_path(prefix: &str, path: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), path.trim_start_matches('/'))
}

type BindFn = fn(&str) -> Result<BoundResource, RegistrationError>;

/// Resources collected for mounting under a common prefix
#[derive(Default)]
pub struct TypedBlueprint {
    entries: Vec<(String, BindFn)>,
}

impl fmt::Debug for TypedBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedBlueprint")
            .field("paths", &self.entries.iter().map(|(path, _)| path).collect::<Vec<_>>())
            .finish()
    }
}

impl TypedBlueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource<R: TypedResource>(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.push((path.into(), BoundResource::bind::<R>));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct TypedApi {
    config: ApiConfig,
    coercions: Coercions,
    paths: HashSet<String>,
    resources: Vec<BoundResource>,
    router: matchit::Router<usize>,
    spec: OpenApiSpec,
}

impl TypedApi {
    pub fn new(config: ApiConfig) -> Self {
        let spec = OpenApiSpec::new(config.title.clone(), config.version.clone());
        let paths = HashSet::from([config.openapi_path.clone(), config.docs_path.clone()]);
        Self {
            config,
            coercions: Coercions::default(),
            paths,
            resources: Vec::new(),
            router: matchit::Router::new(),
            spec,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn coercions(&self) -> &Coercions {
        &self.coercions
    }

    /// Register custom scalar coercions before adding resources
    pub fn coercions_mut(&mut self) -> &mut Coercions {
        &mut self.coercions
    }

    /// Bind `R` to `path` and mount it
    pub fn add_resource<R: TypedResource>(&mut self, path: &str) -> Result<&mut Self, RegistrationError> {
        self.mount(path, BoundResource::bind::<R>)
    }

    /// Mount every resource of `blueprint` under `url_prefix`
    pub fn register_blueprint(
        &mut self,
        blueprint: &TypedBlueprint,
        url_prefix: &str,
    ) -> Result<&mut Self, RegistrationError> {
        for (path, bind) in &blueprint.entries {
            self.mount(&join_path(url_prefix, path), *bind)?;
        }
        Ok(self)
    }

    fn mount(&mut self, path: &str, bind: BindFn) -> Result<&mut Self, RegistrationError> {
        if self.paths.contains(path) {
            return Err(RegistrationError::DuplicatePath(path.to_string()));
        }
        let bound = bind(path)?;
        let schemas = self.component_schemas(&bound)?;

        self.router
            .insert(bound.path.route_path.clone(), self.resources.len())
            .map_err(|e| RegistrationError::RouteConflict {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        self.spec
            .paths
            .insert(bound.path.openapi_path.clone(), bound.generate_path_item());
        for (name, schema) in schemas {
            self.spec.add_schema(name, schema);
        }

        info!(
            resource = bound.name,
            path = %path,
            methods = ?bound.allowed_methods(),
            "mounted resource"
        );

        self.paths.insert(path.to_string());
        self.resources.push(bound);
        Ok(self)
    }

    /// Component schemas of `bound`; one name may not stand for two shapes
    fn component_schemas(&self, bound: &BoundResource) -> Result<Vec<(&'static str, Schema)>, RegistrationError> {
        let mut schemas: Vec<(&'static str, Schema)> = Vec::new();
        for model in bound.contracts().iter().flat_map(|contract| contract.models()) {
            let schema = type_descriptor_to_schema(&model.descriptor).title(model.name);
            let existing = schemas
                .iter()
                .find(|(name, _)| *name == model.name)
                .map(|(_, schema)| schema)
                .or_else(|| {
                    self.spec
                        .components
                        .as_ref()
                        .and_then(|components| components.schemas.get(model.name))
                });
            match existing.map(|existing| *existing == schema) {
                Some(true) => {}
                Some(false) => {
                    return Err(RegistrationError::SchemaNameConflict {
                        name: model.name.to_string(),
                    })
                }
                None => schemas.push((model.name, schema)),
            }
        }
        Ok(schemas)
    }

    pub fn resources(&self) -> &[BoundResource] {
        &self.resources
    }

    pub fn openapi(&self) -> &OpenApiSpec {
        &self.spec
    }

    pub fn openapi_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.spec).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize OpenAPI document");
            serde_json::Value::Null
        })
    }

    pub fn docs_page(&self) -> String {
        redoc_page(&self.config.openapi_path)
    }

    /// Route and dispatch one request
    pub fn handle(&self, mut request: Request) -> Response {
        if request.path == self.config.openapi_path || request.path == self.config.docs_path {
            return self.handle_docs(&request);
        }

        let (index, params) = match self.router.at(&request.path) {
            Ok(matched) => {
                let params: HashMap<String, String> = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), decode_path_param(v)))
                    .collect();
                (*matched.value, params)
            }
            Err(_) => return HttpError::new::<NotFoundError>().into_response(),
        };
        let Some(resource) = self.resources.get(index) else {
            return HttpError::new::<NotFoundError>().into_response();
        };

        let Some(contract) = resource.contract(request.method) else {
            return method_not_allowed(&resource.allowed_methods());
        };

        request.path_params.extend(params);
        contract.dispatch(&request, &self.coercions)
    }

    fn handle_docs(&self, request: &Request) -> Response {
        if request.method != HttpMethod::Get {
            return method_not_allowed(&[HttpMethod::Get]);
        }
        if request.path == self.config.openapi_path {
            Response::json_value(HttpStatus::OK.code(), &self.openapi_json())
        } else {
            Response::html(self.docs_page())
        }
    }
}

fn method_not_allowed(allowed: &[HttpMethod]) -> Response {
    let allow = allowed.iter().map(HttpMethod::as_str).collect::<Vec<_>>().join(", ");
    HttpError::new::<MethodNotAllowedError>()
        .into_response()
        .with_header("allow", allow)
}

fn decode_path_param(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
