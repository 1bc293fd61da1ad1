//! Link relation vocabulary.
//!
//! Relation names are plain strings so extension APIs can add their own
//! without touching the resolution algorithm.

// Navigation
pub const SELF: &str = "self";
pub const FIRST: &str = "first";
pub const NEXT: &str = "next";
pub const PREVIOUS: &str = "prev";
pub const LAST: &str = "last";
pub const COLLECTION: &str = "collection";
pub const SUBCOLLECTIONS: &str = "subcollections";

// Collection entry points
pub const CURRENT_USER: &str = "current-user";
pub const CURRENT_USER_PERSON: &str = "current-user-person";
pub const PERSON: &str = "person";
pub const PERSONS: &str = "persons";
pub const PERSON_SEARCH: &str = "person-search";
pub const PLACE: &str = "place";
pub const SOURCE_DESCRIPTIONS: &str = "source-descriptions";
pub const DISCUSSIONS: &str = "discussions";

// Person neighborhood
pub const PARENTS: &str = "parents";
pub const CHILDREN: &str = "children";
pub const SPOUSES: &str = "spouses";
pub const RELATIONSHIPS: &str = "relationships";
pub const PERSON1: &str = "person1";
pub const PERSON2: &str = "person2";
pub const DESCRIPTION: &str = "description";
pub const AGENT: &str = "agent";

// Embeddable sub-resources
pub const CONCLUSIONS: &str = "conclusions";
pub const NOTES: &str = "notes";
pub const SOURCE_REFERENCES: &str = "source-references";
pub const MEDIA_REFERENCES: &str = "media-references";
pub const EVIDENCE_REFERENCES: &str = "evidence-references";
pub const PARENT_RELATIONSHIPS: &str = "parent-relationships";
pub const SPOUSE_RELATIONSHIPS: &str = "spouse-relationships";
pub const CHILD_RELATIONSHIPS: &str = "child-relationships";
pub const COMMENTS: &str = "comments";

// FamilySearch family tree
pub const MERGE: &str = "merge";
pub const MATCHES: &str = "matches";
pub const NOT_A_MATCH: &str = "non-match";
pub const NOT_A_MATCHES: &str = "non-matches";
pub const RESTORE: &str = "restore";
pub const CHANGE_HISTORY: &str = "change-history";

// OAuth2 endpoints
pub const OAUTH2_TOKEN: &str = "http://oauth.net/core/2.0/endpoint/token";
pub const OAUTH2_AUTHORIZE: &str = "http://oauth.net/core/2.0/endpoint/authorize";
