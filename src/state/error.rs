//! Errors raised by state transitions.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::link::LinkError;
use crate::transport::{HttpResponse, TransportError};

/// Errors raised while building or transitioning application states.
///
/// Navigational absence (a relation the resource does not offer) is not an
/// error: transitions return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum StateError {
    /// The exchange itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A link could not be turned into a URI.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The server answered with a non-advisory 4xx/5xx status.
    ///
    /// Carries the full response so callers can inspect status, headers and body.
    #[error("{method} {uri} failed with HTTP {status}")]
    Application {
        method: Method,
        uri: String,
        status: StatusCode,
        response: Box<HttpResponse>,
    },

    /// The factory has no mapping for the requested state type.
    #[error("unknown state type '{name}'\n  Suggestion: register it with the state factory")]
    UnknownStateType { name: String },

    /// A caller passed an argument the operation cannot accept.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The response body could not be parsed as the expected entity.
    #[error("failed to parse entity from {uri}: {reason}")]
    EntityParse { uri: String, reason: String },

    /// A request payload could not be serialized.
    #[error("failed to serialize request body: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// The token endpoint answered without a usable access token.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },
}

impl StateError {
    /// Creates an `Application` error from a failed exchange.
    #[must_use]
    pub fn application(method: Method, uri: impl Into<String>, response: HttpResponse) -> Self {
        Self::Application {
            method,
            uri: uri.into(),
            status: response.status,
            response: Box::new(response),
        }
    }

    /// Creates an `UnknownStateType` error.
    #[must_use]
    pub fn unknown_state_type(name: impl Into<String>) -> Self {
        Self::UnknownStateType { name: name.into() }
    }

    /// Creates an `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates an `EntityParse` error.
    #[must_use]
    pub fn entity_parse(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EntityParse {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `Authentication` error.
    #[must_use]
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Whether the error is a caller-contract violation rather than a
    /// runtime or server condition.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownStateType { .. } | Self::InvalidArgument { .. } | Self::Link(_)
        )
    }

    /// The HTTP status of an `Application` error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The response carried by an `Application` error.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Application { response, .. } => Some(response),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialization { source }
    }
}
