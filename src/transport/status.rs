//! Classification of HTTP status codes by their meaning to the navigation engine.
//!
//! | Status | Class | Engine behavior |
//! |--------|-------|-----------------|
//! | 1xx, 3xx (except 304) | `Other` | state returned as-is |
//! | 2xx | `Success` | state returned; 200 may be parsed |
//! | 304 | `NotModified` | valid terminal state |
//! | 401, 403 | `AuthFailure` | propagated as an application error |
//! | 410 | `Gone` | state returned; body may carry a tombstone |
//! | 412 | `PreconditionFailed` | state returned; body may carry conflict data |
//! | 429 | `Throttled` | retried by middleware, error once the budget is spent |
//! | other 4xx | `ClientError` | propagated as an application error |
//! | 5xx | `ServerError` | propagated as an application error |

use reqwest::StatusCode;

/// Engine-level meaning of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// 304 Not Modified.
    NotModified,
    /// 410 Gone.
    Gone,
    /// 412 Precondition Failed.
    PreconditionFailed,
    /// 429 Too Many Requests.
    Throttled,
    /// 401 Unauthorized or 403 Forbidden.
    AuthFailure,
    /// Any other 4xx.
    ClientError,
    /// 5xx.
    ServerError,
    /// 1xx and 3xx other than 304.
    Other,
}

impl StatusClass {
    /// Classifies a status code.
    ///
    /// Explicit match arms are used for each status code for documentation purposes,
    /// even though some return the same value.
    #[allow(clippy::match_same_arms)]
    #[must_use]
    pub fn of(status: StatusCode) -> Self {
        match status.as_u16() {
            304 => Self::NotModified,
            401 => Self::AuthFailure,
            403 => Self::AuthFailure,
            410 => Self::Gone,
            412 => Self::PreconditionFailed,
            429 => Self::Throttled,
            code if (200..300).contains(&code) => Self::Success,
            code if (400..500).contains(&code) => Self::ClientError,
            code if (500..600).contains(&code) => Self::ServerError,
            _ => Self::Other,
        }
    }

    /// Statuses that are informative rather than failures: 304, 410 and 412.
    #[must_use]
    pub fn is_advisory(self) -> bool {
        matches!(self, Self::NotModified | Self::Gone | Self::PreconditionFailed)
    }

    /// Statuses surfaced to callers as application errors.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::Throttled | Self::AuthFailure | Self::ClientError | Self::ServerError
        )
    }

    /// Short label used in log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotModified => "not-modified",
            Self::Gone => "gone",
            Self::PreconditionFailed => "precondition-failed",
            Self::Throttled => "throttled",
            Self::AuthFailure => "auth-failure",
            Self::ClientError => "client-error",
            Self::ServerError => "server-error",
            Self::Other => "other",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn class(code: u16) -> StatusClass {
        StatusClass::of(StatusCode::from_u16(code).unwrap())
    }

    #[test]
    fn test_success_codes() {
        for code in [200, 201, 202, 204] {
            assert_eq!(class(code), StatusClass::Success, "status {code}");
        }
    }

    #[test]
    fn test_advisory_codes_are_not_errors() {
        for code in [304, 410, 412] {
            let c = class(code);
            assert!(c.is_advisory(), "status {code} should be advisory");
            assert!(!c.is_error(), "status {code} should not be an error");
        }
    }

    #[test]
    fn test_auth_failures() {
        assert_eq!(class(401), StatusClass::AuthFailure);
        assert_eq!(class(403), StatusClass::AuthFailure);
        assert!(class(401).is_error());
    }

    #[test]
    fn test_throttled_is_error_once_surfaced() {
        assert_eq!(class(429), StatusClass::Throttled);
        assert!(class(429).is_error());
    }

    #[test]
    fn test_generic_client_and_server_errors() {
        assert_eq!(class(404), StatusClass::ClientError);
        assert_eq!(class(400), StatusClass::ClientError);
        assert_eq!(class(500), StatusClass::ServerError);
        assert_eq!(class(503), StatusClass::ServerError);
    }

    #[test]
    fn test_redirects_are_other() {
        assert_eq!(class(301), StatusClass::Other);
        assert!(!class(301).is_error());
    }
}
