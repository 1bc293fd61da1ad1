//! Plain HTTP request and response values exchanged with a [`Transport`](super::Transport).
//!
//! Both types are owned, clonable snapshots. A request is cloned when the
//! throttling middleware re-issues it; a response is stored inside an
//! application state for the lifetime of that state.

use reqwest::header::{
    ALLOW, AUTHORIZATION, CONTENT_TYPE, ETAG, HeaderMap, HeaderName, HeaderValue, LAST_MODIFIED,
    LINK, LOCATION, RETRY_AFTER, WARNING,
};
use reqwest::{Method, StatusCode};
use url::Url;

use super::status::StatusClass;

/// Marker header added to a response that succeeded only after throttled retries.
pub const THROTTLED_HEADER: &str = "x-throttled";

/// An outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute request URI.
    pub uri: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Replaces a header value, returning the request.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body and its content type.
    #[must_use]
    pub fn with_body(mut self, content_type: HeaderValue, body: Vec<u8>) -> Self {
        self.headers.insert(CONTENT_TYPE, content_type);
        self.body = Some(body);
        self
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: impl reqwest::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the bearer token from the `Authorization` header, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.header_str(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

/// A completed HTTP response, body fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body (empty when the server sent none).
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers and an empty body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Replaces a header value, returning the response.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body, returning the response.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Classifies the response status.
    #[must_use]
    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: impl reqwest::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `ETag` validator, verbatim (quotes included).
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.header_str(ETAG)
    }

    /// The `Last-Modified` validator, verbatim.
    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.header_str(LAST_MODIFIED)
    }

    /// The `Location` header.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header_str(LOCATION)
    }

    /// The raw `Retry-After` header.
    #[must_use]
    pub fn retry_after(&self) -> Option<&str> {
        self.header_str(RETRY_AFTER)
    }

    /// Methods listed in the `Allow` header.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<String> {
        self.headers
            .get_all(ALLOW)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(|m| m.trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// All `Warning` header values.
    #[must_use]
    pub fn warnings(&self) -> Vec<&str> {
        self.headers
            .get_all(WARNING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// All `Link` header values.
    #[must_use]
    pub fn link_headers(&self) -> Vec<&str> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Whether the throttling middleware retried before obtaining this response.
    #[must_use]
    pub fn was_throttled(&self) -> bool {
        self.headers.contains_key(THROTTLED_HEADER)
    }

    /// Whether the body is empty.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.iter().all(u8::is_ascii_whitespace)
    }
}
