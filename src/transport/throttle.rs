//! Retry-with-backoff for throttled (HTTP 429) responses.
//!
//! The [`ThrottlingMiddleware`] re-issues a request when the server answers
//! `429 Too Many Requests` with a parsable `Retry-After` header, sleeping for
//! the advertised duration between attempts.
//!
//! # Retry Budget
//!
//! Each call to [`Middleware::handle`] creates its own [`RetryBudget`]. The
//! budget is never shared between requests, so concurrent navigation chains
//! each start with the full allowance. A request is sent at most
//! `max_retries + 1` times regardless of server behavior.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gedcomx_client::transport::parse_retry_after;
//!
//! assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
//! assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
//! assert_eq!(parse_retry_after("soon"), None);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use tracing::{debug, info, instrument, warn};

use super::message::THROTTLED_HEADER;
use super::{HttpRequest, HttpResponse, Middleware, Next, StatusClass, TransportError};

/// Default number of retries after a throttled response.
pub const DEFAULT_MAX_THROTTLE_RETRIES: u32 = 2;

/// Maximum Retry-After value (1 hour) to prevent excessive delays.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Remaining retries for one logical exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
    used: u32,
}

impl RetryBudget {
    /// Creates a budget allowing `max_retries` retries.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            remaining: max_retries,
            used: 0,
        }
    }

    /// Consumes one retry, returning `false` when the budget is exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.used += 1;
        true
    }

    /// Retries still available.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Retries already spent.
    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }
}

/// Middleware that retries throttled requests after the server-mandated delay.
#[derive(Debug, Clone)]
pub struct ThrottlingMiddleware {
    max_retries: u32,
    max_delay: Duration,
}

impl Default for ThrottlingMiddleware {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_THROTTLE_RETRIES)
    }
}

impl ThrottlingMiddleware {
    /// Creates a throttling middleware with the given retry budget.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            max_delay: MAX_RETRY_AFTER,
        }
    }

    /// Caps any single Retry-After sleep.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Returns the configured retry budget.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

#[async_trait]
impl Middleware for ThrottlingMiddleware {
    fn name(&self) -> &str {
        "throttling"
    }

    #[instrument(skip_all, fields(method = %request.method, uri = %request.uri))]
    async fn handle(
        &self,
        request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, TransportError> {
        let mut budget = RetryBudget::new(self.max_retries);

        loop {
            let mut response = next.run(request.clone()).await?;

            if response.status_class() != StatusClass::Throttled {
                if budget.used() > 0 {
                    info!(
                        retries = budget.used(),
                        status = response.status.as_u16(),
                        "request succeeded after throttling"
                    );
                    response
                        .headers
                        .insert(THROTTLED_HEADER, HeaderValue::from_static("true"));
                }
                return Ok(response);
            }

            let Some(delay) = response.retry_after().and_then(parse_retry_after) else {
                debug!("throttled response without usable Retry-After; returning as-is");
                return Ok(response);
            };

            if !budget.try_consume() {
                warn!(
                    max_retries = self.max_retries,
                    "throttle retry budget exhausted; returning throttled response"
                );
                return Ok(response);
            }

            let delay = delay.min(self.max_delay);
            debug!(
                delay_ms = delay.as_millis(),
                attempt = budget.used() + 1,
                remaining = budget.remaining(),
                "throttled; sleeping before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports two formats as per RFC 7231:
/// - Integer seconds: `Retry-After: 120`
/// - HTTP-date: `Retry-After: Wed, 21 Oct 2025 07:28:00 GMT`
///
/// Returns `None` if the value cannot be parsed. Caps excessive values at 1 hour.
#[must_use]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        if seconds < 0 {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        }

        #[allow(clippy::cast_sign_loss)]
        let duration = Duration::from_secs(seconds as u64);
        return Some(duration.min(MAX_RETRY_AFTER));
    }

    if let Ok(datetime) = httpdate::parse_http_date(header_value) {
        let now = std::time::SystemTime::now();
        match datetime.duration_since(now) {
            Ok(duration) => Some(duration.min(MAX_RETRY_AFTER)),
            // Date is in the past
            Err(_) => Some(Duration::ZERO),
        }
    } else {
        debug!(header_value, "unparseable Retry-After value");
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_budget_consumes_until_exhausted() {
        let mut budget = RetryBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let mut budget = RetryBudget::new(0);
        assert!(!budget.try_consume());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_parse_retry_after_integer() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 5 "), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_parse_retry_after_negative_ignored() {
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[test]
    fn test_parse_retry_after_capped() {
        assert_eq!(parse_retry_after("999999"), Some(MAX_RETRY_AFTER));
    }

    #[test]
    fn test_parse_retry_after_past_http_date_is_zero() {
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_retry_after_future_http_date() {
        let future = std::time::SystemTime::now() + Duration::from_secs(120);
        let header = httpdate::fmt_http_date(future);
        let parsed = parse_retry_after(&header).unwrap();
        assert!(parsed <= Duration::from_secs(120));
        assert!(parsed >= Duration::from_secs(100), "got {parsed:?}");
    }

    #[test]
    fn test_parse_retry_after_garbage() {
        assert_eq!(parse_retry_after("later"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn test_throttling_middleware_defaults() {
        let middleware = ThrottlingMiddleware::default();
        assert_eq!(middleware.max_retries(), 2);
        assert_eq!(middleware.name(), "throttling");
    }
}
