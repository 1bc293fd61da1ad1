//! Request modifiers applied to outgoing requests before they are sent.
//!
//! A modifier mutates a request in place. Transitions accept a slice of
//! modifiers and apply them left to right, so when two modifiers target the
//! same header or query parameter the later one wins for replace semantics
//! and both values survive for append semantics.
//!
//! ```
//! use gedcomx_client::modifier::{QueryParameter, RequestModifier, apply_all};
//! use gedcomx_client::transport::HttpRequest;
//! use reqwest::Method;
//! use url::Url;
//!
//! let mut request = HttpRequest::new(Method::GET, Url::parse("https://api.example.com/persons").unwrap());
//! apply_all(&mut request, &[&QueryParameter::count(25), &QueryParameter::start(50)]);
//! assert_eq!(request.uri.query(), Some("count=25&start=50"));
//! ```

mod header;
mod precondition;
mod query;

pub use header::HeaderParameter;
pub use precondition::{CacheDirectives, Preconditions};
pub use query::QueryParameter;

use crate::transport::HttpRequest;

/// A composable mutation of an outgoing request.
pub trait RequestModifier: Send + Sync {
    /// Applies the modification.
    fn apply(&self, request: &mut HttpRequest);
}

/// Applies each modifier in order.
pub fn apply_all(request: &mut HttpRequest, modifiers: &[&dyn RequestModifier]) {
    for modifier in modifiers {
        modifier.apply(request);
    }
}

impl<M: RequestModifier + ?Sized> RequestModifier for &M {
    fn apply(&self, request: &mut HttpRequest) {
        (**self).apply(request);
    }
}
