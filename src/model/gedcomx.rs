//! The `Gedcomx` document and the resources it carries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Linked;
use crate::link::Links;

macro_rules! linked {
    ($($ty:ty),+ $(,)?) => {
        $(impl Linked for $ty {
            fn links(&self) -> &Links {
                &self.links
            }
        })+
    };
}

/// Root of a GEDCOM X representation.
///
/// Includes the FamilySearch collections (discussions, users, merges) so
/// one document type serves both media types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gedcomx {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persons: Vec<Person>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_descriptions: Vec<SourceDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub places: Vec<PlaceDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<Collection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discussions: Vec<Discussion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<Merge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_analyses: Vec<MergeAnalysis>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gedcomx {
    /// A document holding a single person.
    #[must_use]
    pub fn with_person(person: Person) -> Self {
        Self {
            persons: vec![person],
            ..Self::default()
        }
    }

    /// A document holding a single discussion.
    #[must_use]
    pub fn with_discussion(discussion: Discussion) -> Self {
        Self {
            discussions: vec![discussion],
            ..Self::default()
        }
    }
}

/// Reference from one resource to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub resource: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceReference {
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            extra: Map::new(),
        }
    }
}

// ==================== Resources ====================

/// A resource navigated by id and links only.
macro_rules! opaque_resource {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
            pub struct $name {
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub id: Option<String>,
                #[serde(default, skip_serializing_if = "Links::is_empty")]
                pub links: Links,
                #[serde(flatten)]
                pub extra: Map<String, Value>,
            }
        )+
    };
}

opaque_resource!(Person, SourceDescription, Agent, PlaceDescription, Collection);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person1: Option<ResourceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person2: Option<ResourceReference>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

linked!(
    Gedcomx,
    Person,
    Relationship,
    SourceDescription,
    Agent,
    PlaceDescription,
    Collection,
    Discussion,
    Comment,
    User,
);

// ==================== Merges ====================

/// A merge request: which resources of the duplicate to keep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merge {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources_to_delete: Vec<ResourceReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources_to_copy: Vec<ResourceReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The server's analysis of a candidate merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survivor: Option<ResourceReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<ResourceReference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let json = r#"{
            "persons": [{
                "id": "KWQS-BBQ",
                "living": false,
                "names": [{"nameForms": [{"fullText": "John Smith"}]}],
                "links": {"parents": {"href": "/persons/KWQS-BBQ/parents"}}
            }],
            "attribution": {"changeMessage": "import"}
        }"#;
        let doc: Gedcomx = serde_json::from_str(json).unwrap();
        let person = &doc.persons[0];
        assert_eq!(person.id.as_deref(), Some("KWQS-BBQ"));
        assert!(person.links.get("parents").is_some());
        assert_eq!(person.extra["living"], Value::Bool(false));
        assert!(doc.extra.contains_key("attribution"));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            back["persons"][0]["names"][0]["nameForms"][0]["fullText"],
            "John Smith"
        );
        assert_eq!(back["attribution"]["changeMessage"], "import");
    }

    #[test]
    fn test_empty_collections_omitted() {
        let doc = Gedcomx::with_person(Person {
            id: Some("P1".to_string()),
            ..Person::default()
        });
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!({"persons": [{"id": "P1"}]}));
    }

    #[test]
    fn test_relationship_references() {
        let json = r##"{"relationships": [{
            "id": "R1",
            "type": "http://gedcomx.org/Couple",
            "person1": {"resource": "#P1", "resourceId": "P1"},
            "person2": {"resource": "#P2"}
        }]}"##;
        let doc: Gedcomx = serde_json::from_str(json).unwrap();
        let rel = &doc.relationships[0];
        assert_eq!(rel.extra["type"], "http://gedcomx.org/Couple");
        let person1 = rel.person1.as_ref().unwrap();
        assert_eq!(person1.resource, "#P1");
        assert_eq!(person1.extra["resourceId"], "P1");
        assert_eq!(rel.person2.as_ref().map(|r| r.resource.as_str()), Some("#P2"));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["relationships"][0]["person1"]["resourceId"], "P1");
    }
}
