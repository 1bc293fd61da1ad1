//! Wire payloads exchanged with a GEDCOM X API.
//!
//! The genealogical data model is treated as opaque: each type names only
//! the fields navigation needs (identifiers, links, references between
//! resources) and keeps everything else in a flattened `extra` map, so a
//! payload read from the server and written back loses nothing.
//!
//! Two document roots exist: [`Gedcomx`] for resource representations and
//! [`Feed`] for Atom-style result lists (search results, matches, change
//! history).

mod feed;
mod gedcomx;

pub use feed::{Entry, EntryContent, Feed};
pub use gedcomx::{
    Agent, Collection, Comment, Discussion, Gedcomx, Merge, MergeAnalysis, Person,
    PlaceDescription, Relationship, ResourceReference, SourceDescription, User,
};

use crate::link::Links;

/// GEDCOM X JSON.
pub const GEDCOMX_JSON: &str = "application/x-gedcomx-v1+json";
/// GEDCOM X Atom feed JSON.
pub const GEDCOMX_ATOM_JSON: &str = "application/x-gedcomx-atom+json";
/// FamilySearch extension of GEDCOM X JSON.
pub const FAMILYSEARCH_JSON: &str = "application/x-fs-v1+json";
/// OAuth2 token responses.
pub const JSON: &str = "application/json";
/// OAuth2 token requests.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Anything that carries hypermedia links.
pub trait Linked {
    fn links(&self) -> &Links;
}
