//! HTTP transport and middleware.
//!
//! This module provides the send function the navigation engine routes every
//! exchange through, and the cross-cutting middleware that wraps it.
//!
//! # Architecture
//!
//! - [`Transport`] - Async trait for the terminal send function
//! - [`ReqwestTransport`] - reqwest-backed transport
//! - [`Middleware`] / [`Next`] - Composable wrappers around the send function
//! - [`HttpPipeline`] - Ordered middleware chain plus transport
//! - [`ThrottlingMiddleware`] - Bounded retry for 429 + `Retry-After`
//! - [`LoggingMiddleware`] - Per-attempt request/response events
//! - [`ExperimentsMiddleware`] - Fixed feature-tag header on every request
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gedcomx_client::transport::{
//!     HttpPipeline, LoggingMiddleware, ReqwestTransport, ThrottlingMiddleware,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = HttpPipeline::new(Arc::new(ReqwestTransport::new()?))
//!     .with(Arc::new(ThrottlingMiddleware::new(2)))
//!     .with(Arc::new(LoggingMiddleware::default()));
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod experiments;
mod logging;
mod message;
mod pipeline;
mod status;
mod throttle;

pub use client::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, ReqwestTransport};
pub use error::TransportError;
pub use experiments::{ExperimentsMiddleware, FEATURE_TAG_HEADER};
pub use logging::LoggingMiddleware;
pub use message::{HttpRequest, HttpResponse, THROTTLED_HEADER};
pub use pipeline::{HttpPipeline, Middleware, Next, Transport};
pub use status::StatusClass;
pub use throttle::{
    DEFAULT_MAX_THROTTLE_RETRIES, MAX_RETRY_AFTER, RetryBudget, ThrottlingMiddleware,
    parse_retry_after,
};
