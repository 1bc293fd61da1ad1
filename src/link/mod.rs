//! Hypermedia links and their resolution.
//!
//! A [`Link`] names a relation and points at a target either directly
//! (`href`) or through an RFC 6570 template. GEDCOM X JSON serializes the
//! links of an object as a map keyed by relation:
//!
//! ```json
//! { "links": { "person": { "href": "https://api.example.com/persons/KWQS-BBQ" } } }
//! ```
//!
//! Some producers emit a list of link objects that carry their own `rel`
//! instead; [`Links`] accepts both forms and always writes the map form.

mod error;
mod header;
pub mod rel;
mod template;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

pub use error::LinkError;
pub use header::parse_link_header;
pub use template::{TemplateVars, UriTemplate};

/// A hypermedia link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Relation name; empty inside the map form, where the key carries it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rel: String,
    /// Concrete target URI, possibly relative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// URI template used when no href is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Media type of the target representation.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Media types the target accepts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Methods the target allows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Creates a link with a concrete target.
    #[must_use]
    pub fn with_href(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// Creates a templated link.
    #[must_use]
    pub fn with_template(rel: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            template: Some(template.into()),
            ..Self::default()
        }
    }

    /// Whether the link has a target at all.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.href.is_some() || self.template.is_some()
    }

    /// Resolves the link to an absolute URI.
    ///
    /// The href wins when present and is joined against `base`; otherwise
    /// the template is expanded with `vars`.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Unusable`] if the link has no target
    /// - [`LinkError::Malformed`] / [`LinkError::MissingVariable`] from expansion
    /// - [`LinkError::InvalidUri`] if the result does not parse as a URI
    pub fn resolve(&self, base: &Url, vars: &TemplateVars) -> Result<Url, LinkError> {
        let target = match (&self.href, &self.template) {
            (Some(href), _) => href.clone(),
            (None, Some(template)) => UriTemplate::parse(template)?.expand(vars)?,
            (None, None) => return Err(LinkError::unusable(&self.rel)),
        };
        base.join(&target)
            .map_err(|_| LinkError::invalid_uri(&self.rel, &target))
    }
}

/// The links of one object, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links(Vec<Link>);

impl Links {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First link with the given relation.
    #[must_use]
    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel == rel)
    }

    /// Adds a link; an existing link with the same relation is replaced.
    pub fn insert(&mut self, link: Link) {
        match self.0.iter_mut().find(|existing| existing.rel == link.rel) {
            Some(existing) => *existing = link,
            None => self.0.push(link),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        let mut links = Self::new();
        for link in iter {
            links.insert(link);
        }
        links
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for link in &self.0 {
            let body = Link {
                rel: String::new(),
                ..link.clone()
            };
            map.serialize_entry(&link.rel, &body)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LinksRepr {
    Keyed(BTreeMap<String, Link>),
    Listed(Vec<Link>),
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let links = match LinksRepr::deserialize(deserializer)? {
            LinksRepr::Keyed(map) => map
                .into_iter()
                .map(|(rel, mut link)| {
                    link.rel = rel;
                    link
                })
                .collect(),
            LinksRepr::Listed(list) => list.into_iter().filter(|l| !l.rel.is_empty()).collect(),
        };
        Ok(links)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.com/platform/collection").unwrap()
    }

    #[test]
    fn test_href_joined_against_base() {
        let link = Link::with_href(rel::PERSON, "/platform/tree/persons/KWQS-BBQ");
        let uri = link.resolve(&base(), &TemplateVars::new()).unwrap();
        assert_eq!(
            uri.as_str(),
            "https://api.example.com/platform/tree/persons/KWQS-BBQ"
        );
    }

    #[test]
    fn test_href_wins_over_template() {
        let mut link = Link::with_href(rel::PERSON, "https://api.example.com/a");
        link.template = Some("https://api.example.com/b/{pid}".to_string());
        let uri = link
            .resolve(&base(), &TemplateVars::new().with("pid", "X"))
            .unwrap();
        assert_eq!(uri.path(), "/a");
    }

    #[test]
    fn test_template_expanded() {
        let link = Link::with_template(
            rel::PERSON,
            "https://api.example.com/persons/{pid}{?access_token}",
        );
        let uri = link
            .resolve(&base(), &TemplateVars::new().with("pid", "KWQS-BBQ"))
            .unwrap();
        assert_eq!(uri.as_str(), "https://api.example.com/persons/KWQS-BBQ");
    }

    #[test]
    fn test_template_missing_required_variable() {
        let link = Link::with_template(rel::PERSON, "https://api.example.com/persons/{pid}");
        let err = link.resolve(&base(), &TemplateVars::new()).unwrap_err();
        assert!(matches!(err, LinkError::MissingVariable { .. }));
    }

    #[test]
    fn test_unusable_link() {
        let link = Link {
            rel: "person".to_string(),
            ..Link::default()
        };
        assert!(!link.is_usable());
        assert_eq!(
            link.resolve(&base(), &TemplateVars::new()).unwrap_err(),
            LinkError::unusable("person")
        );
    }

    #[test]
    fn test_keyed_form_deserializes_with_rel_from_key() {
        let links: Links = serde_json::from_str(
            r#"{"person": {"href": "/p/1"}, "search": {"template": "/s{?q}", "type": "application/json"}}"#,
        )
        .unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links.get("person").unwrap().href.as_deref(), Some("/p/1"));
        let search = links.get("search").unwrap();
        assert_eq!(search.template.as_deref(), Some("/s{?q}"));
        assert_eq!(search.media_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_listed_form_deserializes() {
        let links: Links = serde_json::from_str(
            r#"[{"rel": "next", "href": "/p?start=20"}, {"href": "/orphan"}]"#,
        )
        .unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.get("next").is_some());
    }

    #[test]
    fn test_serializes_as_keyed_form_without_rel() {
        let links: Links = vec![Link::with_href("self", "/me")].into_iter().collect();
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(json, serde_json::json!({"self": {"href": "/me"}}));
    }

    #[test]
    fn test_insert_replaces_same_rel() {
        let mut links = Links::new();
        links.insert(Link::with_href("next", "/a"));
        links.insert(Link::with_href("next", "/b"));
        assert_eq!(links.len(), 1);
        assert_eq!(links.get("next").unwrap().href.as_deref(), Some("/b"));
    }
}
