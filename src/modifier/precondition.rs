//! Conditional-request modifiers derived from a prior response's validators.
//!
//! [`Preconditions`] guard a mutation (`If-Match`, `If-Unmodified-Since`):
//! the server refuses with 412 if the resource changed. [`CacheDirectives`]
//! validate a read (`If-None-Match`, `If-Modified-Since`): the server answers
//! 304 if nothing changed. They are separate types so one cannot be passed
//! where the other is meant.

use reqwest::header::{
    ETAG, HeaderName, HeaderValue, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH,
    IF_UNMODIFIED_SINCE, LAST_MODIFIED,
};

use super::RequestModifier;
use crate::transport::{HttpRequest, HttpResponse};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Validators {
    etag: Option<HeaderValue>,
    last_modified: Option<HeaderValue>,
}

impl Validators {
    fn from_response(response: &HttpResponse) -> Self {
        Self {
            etag: response.headers.get(ETAG).cloned(),
            last_modified: response.headers.get(LAST_MODIFIED).cloned(),
        }
    }

    fn apply(&self, request: &mut HttpRequest, etag_header: HeaderName, date_header: HeaderName) {
        if let Some(etag) = &self.etag {
            request.headers.insert(etag_header, etag.clone());
        }
        if let Some(last_modified) = &self.last_modified {
            request.headers.insert(date_header, last_modified.clone());
        }
    }
}

/// `If-Match` / `If-Unmodified-Since` for safe mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preconditions(Validators);

impl Preconditions {
    /// Captures the `ETag` and `Last-Modified` of a response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self(Validators::from_response(response))
    }

    /// Whether any validator was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.etag.is_none() && self.0.last_modified.is_none()
    }
}

impl RequestModifier for Preconditions {
    fn apply(&self, request: &mut HttpRequest) {
        self.0.apply(request, IF_MATCH, IF_UNMODIFIED_SINCE);
    }
}

/// `If-None-Match` / `If-Modified-Since` for cache-validated reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDirectives(Validators);

impl CacheDirectives {
    /// Captures the `ETag` and `Last-Modified` of a response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self(Validators::from_response(response))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.etag.is_none() && self.0.last_modified.is_none()
    }
}

impl RequestModifier for CacheDirectives {
    fn apply(&self, request: &mut HttpRequest) {
        self.0.apply(request, IF_NONE_MATCH, IF_MODIFIED_SINCE);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::{Method, StatusCode};
    use url::Url;

    const LAST_MOD: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

    fn response() -> HttpResponse {
        HttpResponse::new(StatusCode::OK)
            .with_header(ETAG, HeaderValue::from_static("\"abc\""))
            .with_header(LAST_MODIFIED, HeaderValue::from_static(LAST_MOD))
    }

    fn request(method: Method) -> HttpRequest {
        HttpRequest::new(method, Url::parse("https://api.example.com/persons/P1").unwrap())
    }

    #[test]
    fn test_preconditions_set_if_match() {
        let mut req = request(Method::POST);
        Preconditions::from_response(&response()).apply(&mut req);
        assert_eq!(req.header_str(IF_MATCH), Some("\"abc\""));
        assert_eq!(req.header_str(IF_UNMODIFIED_SINCE), Some(LAST_MOD));
        assert!(req.headers.get(IF_NONE_MATCH).is_none());
        assert!(req.headers.get(IF_MODIFIED_SINCE).is_none());
    }

    #[test]
    fn test_cache_directives_set_if_none_match() {
        let mut req = request(Method::GET);
        CacheDirectives::from_response(&response()).apply(&mut req);
        assert_eq!(req.header_str(IF_NONE_MATCH), Some("\"abc\""));
        assert_eq!(req.header_str(IF_MODIFIED_SINCE), Some(LAST_MOD));
        assert!(req.headers.get(IF_MATCH).is_none());
        assert!(req.headers.get(IF_UNMODIFIED_SINCE).is_none());
    }

    #[test]
    fn test_no_validators_is_noop() {
        let bare = HttpResponse::new(StatusCode::OK);
        let preconditions = Preconditions::from_response(&bare);
        assert!(preconditions.is_empty());
        let mut req = request(Method::PUT);
        preconditions.apply(&mut req);
        assert!(req.headers.is_empty());
    }
}
