//! Header modifiers.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderName, HeaderValue};

use super::RequestModifier;
use crate::transport::{HttpRequest, TransportError};

/// Adds or replaces a named header.
///
/// Names and values are validated when the modifier is built, so applying
/// it cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderParameter {
    name: HeaderName,
    values: Vec<HeaderValue>,
    replace: bool,
}

impl HeaderParameter {
    /// Replaces any existing values of the header.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] for an invalid name or value.
    pub fn replace<I, S>(name: &str, values: I) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(name, values, true)
    }

    /// Adds values after any existing values of the header.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] for an invalid name or value.
    pub fn append<I, S>(name: &str, values: I) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(name, values, false)
    }

    /// `Accept-Language`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `lang` is not valid header text.
    pub fn lang(lang: &str) -> Result<Self, TransportError> {
        Self::replace(ACCEPT_LANGUAGE.as_str(), [lang])
    }

    /// `Accept`, overriding the state's default media type.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if `media_type` is not valid header text.
    pub fn accept(media_type: &str) -> Result<Self, TransportError> {
        Self::replace(ACCEPT.as_str(), [media_type])
    }

    fn build<I, S>(name: &str, values: I, replace: bool) -> Result<Self, TransportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::invalid_request(format!("invalid header name '{name}'")))?;
        let values = values
            .into_iter()
            .map(|value| {
                HeaderValue::from_str(value.as_ref()).map_err(|_| {
                    TransportError::invalid_request(format!("invalid value for header '{name}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: header_name,
            values,
            replace,
        })
    }
}

impl RequestModifier for HeaderParameter {
    fn apply(&self, request: &mut HttpRequest) {
        if self.replace {
            request.headers.remove(&self.name);
        }
        for value in &self.values {
            request.headers.append(self.name.clone(), value.clone());
        }
    }
}
