//! Error types for link resolution.

use thiserror::Error;

/// Errors raised while turning a link into a concrete URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The template text is not a valid RFC 6570 template.
    #[error("malformed URI template '{template}': {reason}")]
    Malformed {
        /// The offending template.
        template: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A required template variable was not supplied.
    #[error(
        "URI template '{template}' requires variable '{variable}'\n  Suggestion: supply '{variable}' in the template variables"
    )]
    MissingVariable {
        /// The template being expanded.
        template: String,
        /// The missing variable name.
        variable: String,
    },

    /// The href or expansion is not a valid URI.
    #[error("link '{rel}' resolves to invalid URI '{uri}'")]
    InvalidUri {
        /// The relation being resolved.
        rel: String,
        /// The offending URI text.
        uri: String,
    },

    /// The link carries neither an href nor a template.
    #[error("link '{rel}' has neither an href nor a template")]
    Unusable {
        /// The relation being resolved.
        rel: String,
    },
}

impl LinkError {
    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(template: &str, reason: &str) -> Self {
        Self::Malformed {
            template: template.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `MissingVariable` error.
    #[must_use]
    pub fn missing_variable(template: &str, variable: &str) -> Self {
        Self::MissingVariable {
            template: template.to_string(),
            variable: variable.to_string(),
        }
    }

    /// Creates an `InvalidUri` error.
    #[must_use]
    pub fn invalid_uri(rel: &str, uri: &str) -> Self {
        Self::InvalidUri {
            rel: rel.to_string(),
            uri: uri.to_string(),
        }
    }

    /// Creates an `Unusable` error.
    #[must_use]
    pub fn unusable(rel: &str) -> Self {
        Self::Unusable {
            rel: rel.to_string(),
        }
    }
}
