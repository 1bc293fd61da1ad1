//! reqwest-backed [`Transport`].
//!
//! The client is designed to be created once and reused for every exchange
//! of a navigation session, taking advantage of connection pooling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::user_agent;

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Transport that performs real HTTP exchanges with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default timeouts and the crate User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] when the client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(
            CONNECT_TIMEOUT_SECS,
            READ_TIMEOUT_SECS,
            &user_agent::default_user_agent(),
        )
    }

    /// Creates a transport with explicit timeouts and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] when the client cannot be built.
    #[instrument(level = "debug")]
    pub fn with_settings(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|e| {
                TransportError::invalid_request(format!("HTTP client construction failed: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            uri,
            headers,
            body,
        } = request;
        let uri_text = uri.to_string();

        let mut builder = self.client.request(method.clone(), uri).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let map_error = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::timeout(method.clone(), uri_text.clone())
            } else {
                TransportError::network(method.clone(), uri_text.clone(), e)
            }
        };

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_error)?.to_vec();

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "response buffered"
        );

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
