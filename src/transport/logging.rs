//! Request/response observability.
//!
//! [`LoggingMiddleware`] emits one event before each send (method, URI and
//! headers) and one after each response (status, status class, `Warning`
//! headers). It never alters the request or response.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, PROXY_AUTHORIZATION};
use tracing::{debug, info, warn};

use super::{HttpRequest, HttpResponse, Middleware, Next, TransportError};

const REDACTED: &str = "<redacted>";

/// Middleware that logs every attempt that passes through it.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    log_headers: bool,
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LoggingMiddleware {
    /// Creates a logging middleware; `log_headers` controls header dumps.
    #[must_use]
    pub fn new(log_headers: bool) -> Self {
        Self { log_headers }
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    fn name(&self) -> &str {
        "logging"
    }

    async fn handle(
        &self,
        request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, TransportError> {
        let method = request.method.clone();
        let uri = request.uri.to_string();

        if self.log_headers {
            debug!(
                method = %method,
                uri = %uri,
                headers = %render_headers(&request.headers),
                "sending request"
            );
        } else {
            debug!(method = %method, uri = %uri, "sending request");
        }

        let result = next.run(request).await;

        match &result {
            Ok(response) => {
                let class = response.status_class();
                for warning in response.warnings() {
                    warn!(method = %method, uri = %uri, warning, "server warning");
                }
                if class.is_error() {
                    info!(
                        method = %method,
                        uri = %uri,
                        status = response.status.as_u16(),
                        class = class.as_str(),
                        "request failed"
                    );
                } else {
                    debug!(
                        method = %method,
                        uri = %uri,
                        status = response.status.as_u16(),
                        class = class.as_str(),
                        "response received"
                    );
                }
                if self.log_headers {
                    debug!(headers = %render_headers(&response.headers), "response headers");
                }
            }
            Err(error) => {
                warn!(method = %method, uri = %uri, error = %error, "transport failure");
            }
        }

        result
    }
}

/// Renders headers as `name: value` pairs with credentials redacted.
fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name == AUTHORIZATION || name == PROXY_AUTHORIZATION {
                REDACTED
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{name}: {shown}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
