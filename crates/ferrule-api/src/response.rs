//! Outgoing response representation

use bytes::Bytes;
use ferrule_common::http::{HttpResponseLike, HttpStatus};
use std::collections::HashMap;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Response produced by dispatch: status, MIME type, extra headers and body bytes
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub mime_type: String,
    /// Extra headers (lower-case keys); `content-type` is derived from `mime_type`
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, mime_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            mime_type: mime_type.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// JSON response from an already-built value
    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, APPLICATION_JSON, value.to_string())
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self::new(status, TEXT_PLAIN, text.into())
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::new(HttpStatus::OK.code(), TEXT_HTML, html.into())
    }

    pub fn no_content() -> Self {
        Self::new(HttpStatus::NO_CONTENT.code(), "", Bytes::new())
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl HttpResponseLike for Response {
    fn status_code(&self) -> u16 {
        self.status
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn body_bytes(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response() {
        let response = Response::json_value(201, &serde_json::json!({"id": 7}));
        assert_eq!(response.status, 201);
        assert_eq!(response.mime_type, APPLICATION_JSON);
        assert_eq!(response.json().unwrap()["id"], 7);
        assert!(response.is_success());
    }

    #[test]
    fn test_no_content() {
        let response = Response::no_content().with_header("X-Trace", "abc");
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
        assert_eq!(response.header("x-trace"), Some("abc"));
    }
}
