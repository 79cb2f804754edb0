//! HTTP server using Hyper 1.0
//!
//! Converts incoming hyper requests into [`Request`], dispatches them through
//! a shared [`TypedApi`] and converts the [`Response`] back. Runs until
//! Ctrl+C or SIGTERM.

use crate::api::TypedApi;
use crate::error::ApiError;
use crate::http_error::HttpError;
use crate::request::Request;
use crate::response::Response;
use ferrule_common::http::HttpMethod;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Bytes, Request as HyperRequest, Response as HyperResponse};
use hyper_util::rt::TokioIo;
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn, Instrument};

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_addr: String,
    /// Maximum request body size in bytes (default: 10MB)
    pub max_body_size: usize,
    /// Log every request at info level
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            max_body_size: 10 * 1024 * 1024,
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Default::default()
        }
    }

    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

/// HTTP server serving one [`TypedApi`]
pub struct Server {
    api: Arc<TypedApi>,
    config: ServerConfig,
}

impl Server {
    pub fn new(api: TypedApi, config: ServerConfig) -> Self {
        Self {
            api: Arc::new(api),
            config,
        }
    }

    pub fn with_shared_api(api: Arc<TypedApi>, config: ServerConfig) -> Self {
        Self { api, config }
    }

    /// Run the server until a shutdown signal is received
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ferrule_api::{ApiConfig, Server, ServerConfig, TypedApi};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let api = TypedApi::new(ApiConfig::new("Todo API"));
    ///     Server::new(api, ServerConfig::new("127.0.0.1:8000")).run().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr: SocketAddr = self.config.bind_addr.parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on http://{}", addr);
        info!(
            "OpenAPI document at {}, docs at {}",
            self.api.config().openapi_path,
            self.api.config().docs_path
        );

        tokio::select! {
            result = accept_loop(listener, self.api.clone(), self.config.clone()) => {
                result.map_err(Into::into)
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, stopping server");
                Ok(())
            }
        }
    }

    pub fn bind_addr(&self) -> &str {
        &self.config.bind_addr
    }

    pub fn api(&self) -> &TypedApi {
        &self.api
    }
}

/// Accept connections and serve each on its own task
async fn accept_loop(listener: TcpListener, api: Arc<TypedApi>, config: ServerConfig) -> std::io::Result<()> {
    loop {
        let (stream, remote_addr) = listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        let io = TokioIo::new(stream);
        let api = api.clone();
        let config = config.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, api.clone(), config.clone(), remote_addr));
            if let Err(err) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(io, service)
                .await
            {
                error!("Error serving connection: {:?}", err);
            }
        });
    }
}

async fn handle_request(
    hyper_req: HyperRequest<Incoming>,
    api: Arc<TypedApi>,
    config: ServerConfig,
    remote_addr: SocketAddr,
) -> Result<HyperResponse<http_body_util::Full<Bytes>>, Infallible> {
    let (parts, body) = hyper_req.into_parts();
    let span = tracing::info_span!(
        "http.request",
        http.method = %parts.method,
        http.target = %parts.uri.path(),
        http.client_ip = %remote_addr.ip(),
        http.status_code = tracing::field::Empty,
    );

    async move {
        let method = match HttpMethod::from_str(parts.method.as_str()) {
            Ok(method) => method,
            Err(e) => {
                let response = HttpError::from(ApiError::MethodNotAllowed(e)).into_response();
                tracing::Span::current().record("http.status_code", response.status);
                return Ok(convert_response_to_hyper(response));
            }
        };

        let body_bytes = match collect_body(body, config.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Rejected request body: {}", e);
                let response = HttpError::from(e).into_response();
                tracing::Span::current().record("http.status_code", response.status);
                return Ok(convert_response_to_hyper(response));
            }
        };

        let request = convert_hyper_request(
            method,
            parts.uri.path(),
            parts.uri.query(),
            &parts.headers,
            body_bytes,
        );

        let response = api.handle(request);
        tracing::Span::current().record("http.status_code", response.status);
        if config.enable_logging {
            info!(status = response.status, "{} {}", method, parts.uri.path());
        }

        Ok(convert_response_to_hyper(response))
    }
    .instrument(span)
    .await
}

/// Decode a query component, borrowing when nothing is encoded
#[inline]
fn decode_query_component(s: &str) -> Cow<'_, str> {
    if !s.contains('+') && !s.contains('%') {
        return Cow::Borrowed(s);
    }

    if s.contains('+') {
        let with_spaces = s.replace('+', " ");
        match urlencoding::decode(&with_spaces) {
            Ok(decoded) => Cow::Owned(decoded.into_owned()),
            Err(_) => Cow::Owned(with_spaces),
        }
    } else {
        match urlencoding::decode(s) {
            Ok(decoded) => decoded,
            Err(_) => Cow::Borrowed(s),
        }
    }
}

fn convert_hyper_request(
    method: HttpMethod,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Request {
    let mut req = Request::new(method, path);

    if let Some(query_string) = query {
        for pair in query_string.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            req = req.with_query_param(
                decode_query_component(key).into_owned(),
                decode_query_component(value).into_owned(),
            );
        }
    }

    for (name, value) in headers.iter() {
        if let Ok(value_str) = value.to_str() {
            req = req.with_header(name.as_str(), value_str);
        }
    }

    req.with_body(body)
}

/// Collect request body with size limit; reading stops once the limit is crossed
async fn collect_body<B>(body: B, max_size: usize) -> Result<Bytes, ApiError>
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    use http_body_util::{BodyExt, LengthLimitError, Limited};

    match Limited::new(body, max_size).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(ApiError::PayloadTooLarge(
            format!("max: {} bytes", max_size),
        )),
        Err(e) => Err(ApiError::BadRequest(e.to_string())),
    }
}

fn convert_response_to_hyper(response: Response) -> HyperResponse<http_body_util::Full<Bytes>> {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_length = response.body.len();

    let mut builder = HyperResponse::builder().status(status);
    if !response.mime_type.is_empty() {
        builder = builder.header(CONTENT_TYPE, response.mime_type.as_str());
    }
    for (name, value) in response.headers.iter() {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !response.headers.contains_key("content-length") {
        builder = builder.header(CONTENT_LENGTH, content_length);
    }

    builder
        .body(http_body_util::Full::new(response.body))
        .unwrap_or_else(|err| {
            error!("Failed to build response: {}", err);
            let mut fallback = HyperResponse::new(http_body_util::Full::new(Bytes::from_static(
                b"Internal Server Error",
            )));
            *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        })
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
