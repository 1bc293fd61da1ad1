//! Transport seam and middleware composition.
//!
//! A [`Transport`] sends one request and returns one response. A
//! [`Middleware`] wraps the send function: it receives the request and a
//! [`Next`] handle for the rest of the chain, and may inspect or alter the
//! request, call `next` zero or more times, and inspect or alter the response.
//!
//! [`HttpPipeline`] composes an ordered list of middleware around a terminal
//! transport. The first middleware added is the outermost one.
//!
//! # Object Safety
//!
//! Both traits use `async_trait` so they can be stored as `Arc<dyn ...>`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::debug;

use super::{HttpRequest, HttpResponse, TransportError};

/// The underlying send function.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and buffers the full response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Cross-cutting behavior wrapped around a [`Transport`].
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs and `Debug` output.
    fn name(&self) -> &str;

    /// Handles a request, delegating to `next` for the remainder of the chain.
    async fn handle(
        &self,
        request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, TransportError>;
}

/// The remainder of a middleware chain.
///
/// `Next` is `Copy`, so a middleware may run the remainder more than once
/// (the throttling middleware does so for each retry).
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Runs the remaining middleware, then the transport.
    pub fn run(self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            match self.middleware.split_first() {
                Some((current, rest)) => {
                    let next = Next {
                        middleware: rest,
                        transport: self.transport,
                    };
                    current.handle(request, next).await
                }
                None => self.transport.send(request).await,
            }
        })
    }
}

/// An ordered middleware chain around a terminal transport.
#[derive(Clone)]
pub struct HttpPipeline {
    middleware: Vec<Arc<dyn Middleware>>,
    transport: Arc<dyn Transport>,
}

impl HttpPipeline {
    /// Creates a pipeline with no middleware.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            middleware: Vec::new(),
            transport,
        }
    }

    /// Appends a middleware; earlier middleware wraps later middleware.
    #[must_use]
    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        debug!(name = middleware.name(), "registering middleware");
        self.middleware.push(middleware);
        self
    }

    /// Returns the number of registered middleware.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Sends a request through the full chain.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the exchange could not be completed.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let next = Next {
            middleware: &self.middleware,
            transport: self.transport.as_ref(),
        };
        next.run(request).await
    }
}

impl fmt::Debug for HttpPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.middleware.iter().map(|m| m.name()).collect();
        f.debug_struct("HttpPipeline")
            .field("middleware", &names)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use reqwest::header::{HeaderName, HeaderValue};
    use reqwest::{Method, StatusCode};
    use url::Url;

    use super::*;

    /// Records the order in which middleware saw the request.
    struct Recording {
        label: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Recording {
        fn name(&self) -> &str {
            self.label
        }

        async fn handle(
            &self,
            request: HttpRequest,
            next: Next<'_>,
        ) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(self.label);
            next.run(request).await
        }
    }

    /// Echoes the header set by middleware back as the response body.
    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let tag = request.header_str("x-tag").unwrap_or("none").to_string();
            Ok(HttpResponse::new(StatusCode::OK).with_body(tag))
        }
    }

    struct Tagging;

    #[async_trait]
    impl Middleware for Tagging {
        fn name(&self) -> &str {
            "tagging"
        }

        async fn handle(
            &self,
            mut request: HttpRequest,
            next: Next<'_>,
        ) -> Result<HttpResponse, TransportError> {
            request.headers.insert(
                HeaderName::from_static("x-tag"),
                HeaderValue::from_static("tagged"),
            );
            next.run(request).await
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::new(Method::GET, Url::parse("https://api.example.com/").unwrap())
    }

    #[tokio::test]
    async fn test_pipeline_without_middleware_reaches_transport() {
        let pipeline = HttpPipeline::new(Arc::new(EchoTransport));
        let response = pipeline.send(request()).await.unwrap();
        assert_eq!(response.body, b"none");
    }

    #[tokio::test]
    async fn test_middleware_runs_outermost_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = HttpPipeline::new(Arc::new(EchoTransport))
            .with(Arc::new(Recording {
                label: "outer",
                seen: Arc::clone(&seen),
            }))
            .with(Arc::new(Recording {
                label: "inner",
                seen: Arc::clone(&seen),
            }));
        pipeline.send(request()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn test_middleware_can_modify_request() {
        let pipeline = HttpPipeline::new(Arc::new(EchoTransport)).with(Arc::new(Tagging));
        let response = pipeline.send(request()).await.unwrap();
        assert_eq!(response.body, b"tagged");
    }

    #[test]
    fn test_pipeline_debug_lists_middleware_names() {
        let pipeline = HttpPipeline::new(Arc::new(EchoTransport)).with(Arc::new(Tagging));
        let debug = format!("{pipeline:?}");
        assert!(debug.contains("tagging"), "got: {debug}");
        assert_eq!(pipeline.middleware_count(), 1);
    }
}
