//! Transport-neutral request representation
//!
//! Everything a handler contract reads: query pairs, headers, router path
//! parameters and the raw body.

use bytes::Bytes;
use ferrule_common::http::{HttpMethod, HttpRequestLike};
use std::collections::HashMap;

/// Incoming request, already detached from the transport
#[derive(Debug, Clone)]
pub struct Request {
    pub method: HttpMethod,
    pub path: String,
    /// Query pairs in arrival order (duplicates kept)
    pub query: Vec<(String, String)>,
    /// Header map with lower-case keys
    pub headers: HashMap<String, String>,
    /// Path parameters extracted by the router
    pub path_params: HashMap<String, String>,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HashMap::new(),
            path_params: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and the matching content type
    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    /// First value for a query key
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(|s| s.as_str())
    }

    /// Body bytes, or `None` for an empty body
    pub fn body(&self) -> Option<&[u8]> {
        if self.body.is_empty() {
            None
        } else {
            Some(&self.body)
        }
    }
}

impl HttpRequestLike for Request {
    fn method(&self) -> HttpMethod {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn body_bytes(&self) -> Option<&[u8]> {
        self.body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_query_value_wins() {
        let req = Request::new(HttpMethod::Get, "/users")
            .with_query_param("id", "1")
            .with_query_param("id", "2");
        assert_eq!(req.query_param("id"), Some("1"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_headers_case_insensitive() {
        let req = Request::new(HttpMethod::Get, "/todo").with_header("Accept-Language", "en-US");
        assert_eq!(req.header("accept-language"), Some("en-US"));
        assert_eq!(req.header("ACCEPT-LANGUAGE"), Some("en-US"));
    }

    #[test]
    fn test_empty_body_is_absent() {
        let req = Request::new(HttpMethod::Post, "/todo");
        assert!(req.body().is_none());

        let req = req.with_json(&serde_json::json!({"id": 1}));
        assert_eq!(req.content_type(), Some("application/json"));
        assert_eq!(req.body(), Some(br#"{"id":1}"#.as_slice()));
    }
}
