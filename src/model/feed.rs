//! Atom-style result feeds.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Gedcomx, Linked};
use crate::link::Links;

/// A page of results: search hits, match candidates, change history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    /// Total result count across all pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One feed entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<EntryContent>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// The embedded GEDCOM X document, if any.
    #[must_use]
    pub fn gedcomx(&self) -> Option<&Gedcomx> {
        self.content.as_ref().and_then(|c| c.gedcomx.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gedcomx: Option<Gedcomx>,
}

impl Linked for Feed {
    fn links(&self) -> &Links {
        &self.links
    }
}

impl Linked for Entry {
    fn links(&self) -> &Links {
        &self.links
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_feed_parses() {
        let json = r#"{
            "results": 143,
            "index": 0,
            "links": {"next": {"href": "/search?start=10"}},
            "entries": [{
                "id": "KWQS-BBQ",
                "score": 0.97,
                "confidence": 5,
                "links": {"person": {"href": "/persons/KWQS-BBQ"}},
                "content": {"gedcomx": {"persons": [{"id": "KWQS-BBQ"}]}}
            }]
        }"#;
        let feed: Feed = serde_json::from_str(json).unwrap();
        assert_eq!(feed.results, Some(143));
        assert!(feed.links.get("next").is_some());
        let entry = &feed.entries[0];
        assert_eq!(entry.score, Some(0.97));
        assert_eq!(entry.extra["confidence"], 5);
        assert_eq!(
            entry.gedcomx().and_then(|g| g.persons[0].id.as_deref()),
            Some("KWQS-BBQ")
        );
    }

    #[test]
    fn test_entry_without_content() {
        let entry: Entry = serde_json::from_str(r#"{"id": "change-1"}"#).unwrap();
        assert!(entry.gedcomx().is_none());
    }
}
