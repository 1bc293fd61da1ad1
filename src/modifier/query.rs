//! Query-string modifiers.

use url::form_urlencoded;

use super::RequestModifier;
use crate::transport::HttpRequest;

/// Adds or replaces a named query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameter {
    name: String,
    values: Vec<String>,
    replace: bool,
}

impl QueryParameter {
    /// Replaces every existing value of `name` with `values`.
    #[must_use]
    pub fn replace<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            replace: true,
        }
    }

    /// Appends `values` after any existing values of `name`.
    #[must_use]
    pub fn append<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            replace: false,
        }
    }

    /// Page size.
    #[must_use]
    pub fn count(count: u32) -> Self {
        Self::replace("count", [count.to_string()])
    }

    /// Page offset.
    #[must_use]
    pub fn start(start: u32) -> Self {
        Self::replace("start", [start.to_string()])
    }

    /// Number of generations for pedigree reads.
    #[must_use]
    pub fn generations(generations: u32) -> Self {
        Self::replace("generations", [generations.to_string()])
    }

    /// Token in the query string, for endpoints that cannot take headers.
    #[must_use]
    pub fn access_token(token: impl Into<String>) -> Self {
        Self::replace("access_token", [token.into()])
    }

    /// Asks for full person details in relationship reads.
    #[must_use]
    pub fn person_details() -> Self {
        Self::replace("persons", ["true"])
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl QueryParameter {
    fn names(&self, segment: &str) -> bool {
        form_urlencoded::parse(segment.as_bytes())
            .next()
            .is_some_and(|(key, _)| key == self.name)
    }
}

impl RequestModifier for QueryParameter {
    /// Untouched parameters keep their original encoding.
    fn apply(&self, request: &mut HttpRequest) {
        let current = request.uri.query().unwrap_or_default();
        let replacing = self.replace && current.split('&').any(|segment| self.names(segment));
        if self.values.is_empty() && !replacing {
            return;
        }

        let mut added = form_urlencoded::Serializer::new(String::new());
        for value in &self.values {
            added.append_pair(&self.name, value);
        }
        let added = added.finish();
        let query = current
            .split('&')
            .filter(|segment| !segment.is_empty() && !(self.replace && self.names(segment)))
            .chain((!added.is_empty()).then_some(added.as_str()))
            .collect::<Vec<_>>()
            .join("&");

        request
            .uri
            .set_query((!query.is_empty()).then_some(query.as_str()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::Method;
    use url::Url;

    fn request(uri: &str) -> HttpRequest {
        HttpRequest::new(Method::GET, Url::parse(uri).unwrap())
    }

    #[test]
    fn test_replace_drops_existing_values_only_for_name() {
        let mut req = request("https://api.example.com/s?q=a&count=5&q=b");
        QueryParameter::replace("q", ["c"]).apply(&mut req);
        assert_eq!(req.uri.query(), Some("count=5&q=c"));
    }

    #[test]
    fn test_multi_value() {
        let mut req = request("https://api.example.com/s");
        QueryParameter::append("ids", ["P1", "P2"]).apply(&mut req);
        assert_eq!(req.uri.query(), Some("ids=P1&ids=P2"));
    }

    #[test]
    fn test_values_are_encoded() {
        let mut req = request("https://api.example.com/s");
        QueryParameter::replace("q", ["givenName:John surname:Smith"]).apply(&mut req);
        assert_eq!(
            req.uri.query(),
            Some("q=givenName%3AJohn+surname%3ASmith")
        );
    }

    #[test]
    fn test_replace_with_no_values_clears_query() {
        let mut req = request("https://api.example.com/s?start=0");
        QueryParameter::replace("start", Vec::<String>::new()).apply(&mut req);
        assert_eq!(req.uri.query(), None);
    }

    #[test]
    fn test_untouched_parameters_keep_their_encoding() {
        let mut req = request("https://api.example.com/s?q=John%20Smith&flag&start=0");
        QueryParameter::start(20).apply(&mut req);
        assert_eq!(req.uri.query(), Some("q=John%20Smith&flag&start=20"));

        QueryParameter::append("ids", ["P1"]).apply(&mut req);
        assert_eq!(req.uri.query(), Some("q=John%20Smith&flag&start=20&ids=P1"));
    }

    #[test]
    fn test_replace_of_absent_name_without_values_is_noop() {
        let mut req = request("https://api.example.com/s?q=a%20b&flag");
        QueryParameter::replace("count", Vec::<String>::new()).apply(&mut req);
        assert_eq!(req.uri.query(), Some("q=a%20b&flag"));
    }

    #[test]
    fn test_helpers() {
        let mut req = request("https://api.example.com/p");
        QueryParameter::generations(4).apply(&mut req);
        QueryParameter::person_details().apply(&mut req);
        QueryParameter::access_token("tok").apply(&mut req);
        assert_eq!(
            req.uri.query(),
            Some("generations=4&persons=true&access_token=tok")
        );
    }
}
