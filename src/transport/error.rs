//! Error types for the transport layer.
//!
//! Transport errors describe failures to complete an HTTP exchange at all.
//! A completed exchange with an error status is *not* a transport error; it
//! is returned as an [`HttpResponse`](super::HttpResponse) and interpreted by
//! the state engine.

use reqwest::Method;
use thiserror::Error;

/// Errors that can occur while sending a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error sending {method} {uri}: {source}")]
    Network {
        /// Request method.
        method: Method,
        /// The URI that failed.
        uri: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before a response arrived.
    #[error("timeout sending {method} {uri}")]
    Timeout {
        /// Request method.
        method: Method,
        /// The URI that timed out.
        uri: String,
    },

    /// The request could not be constructed or the underlying client could not be built.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },
}

impl TransportError {
    /// Creates a network error from a reqwest error.
    pub fn network(method: Method, uri: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            method,
            uri: uri.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(method: Method, uri: impl Into<String>) -> Self {
        Self::Timeout {
            method,
            uri: uri.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_timeout_display() {
        let error = TransportError::timeout(Method::GET, "https://api.example.com/collections");
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "Expected 'timeout' in: {msg}");
        assert!(msg.contains("GET"), "Expected method in: {msg}");
        assert!(
            msg.contains("https://api.example.com/collections"),
            "Expected URI in: {msg}"
        );
    }

    #[test]
    fn test_transport_error_invalid_request_display() {
        let error = TransportError::invalid_request("client builder failed");
        assert!(error.to_string().contains("client builder failed"));
    }
}
