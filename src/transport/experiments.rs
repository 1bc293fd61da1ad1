//! Feature-flag tagging.
//!
//! FamilySearch exposes pre-release behavior behind feature tags. The
//! [`ExperimentsMiddleware`] attaches a fixed `X-FS-Feature-Tag` header to
//! every request sent through a client instance.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

use super::{HttpRequest, HttpResponse, Middleware, Next, TransportError};

/// Header carrying the enabled feature tags.
pub const FEATURE_TAG_HEADER: HeaderName = HeaderName::from_static("x-fs-feature-tag");

/// Middleware that tags every outgoing request with a fixed feature-tag list.
#[derive(Debug, Clone)]
pub struct ExperimentsMiddleware {
    value: HeaderValue,
}

impl ExperimentsMiddleware {
    /// Creates the middleware from a list of feature tags.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] when the tag list is empty or
    /// cannot be encoded as a header value.
    pub fn new<I, S>(tags: I) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            return Err(TransportError::invalid_request(
                "experiments middleware requires at least one feature tag",
            ));
        }
        let value = HeaderValue::from_str(&joined).map_err(|_| {
            TransportError::invalid_request(format!("feature tags are not a valid header: {joined}"))
        })?;
        Ok(Self { value })
    }

    /// The header value sent with each request.
    #[must_use]
    pub fn header_value(&self) -> &HeaderValue {
        &self.value
    }
}

#[async_trait]
impl Middleware for ExperimentsMiddleware {
    fn name(&self) -> &str {
        "experiments"
    }

    async fn handle(
        &self,
        mut request: HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, TransportError> {
        request
            .headers
            .insert(FEATURE_TAG_HEADER, self.value.clone());
        next.run(request).await
    }
}
