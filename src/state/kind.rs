//! Resource-type identities and the per-type capability contract.

use std::fmt;
use std::str::FromStr;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{AnyState, ApplicationState, StateError};
use crate::link::{Links, rel};
use crate::model::{GEDCOMX_ATOM_JSON, GEDCOMX_JSON, Linked};

const CONCLUSION_RELATIONS: &[&str] = &[
    rel::CONCLUSIONS,
    rel::NOTES,
    rel::SOURCE_REFERENCES,
    rel::MEDIA_REFERENCES,
    rel::EVIDENCE_REFERENCES,
];

const PERSON_RELATIONS: &[&str] = &[
    rel::CONCLUSIONS,
    rel::NOTES,
    rel::SOURCE_REFERENCES,
    rel::MEDIA_REFERENCES,
    rel::EVIDENCE_REFERENCES,
    rel::PARENT_RELATIONSHIPS,
    rel::SPOUSE_RELATIONSHIPS,
    rel::CHILD_RELATIONSHIPS,
];

/// Every resource type the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKind {
    Collection,
    Person,
    PersonParents,
    PersonChildren,
    PersonSpouses,
    Relationship,
    Discussion,
    Place,
    User,
    SourceDescription,
    Agent,
    PersonSearchResults,
    PersonMatchResults,
    PersonNonMatches,
    PersonMerge,
    ChangeHistory,
}

impl StateKind {
    pub const ALL: [Self; 16] = [
        Self::Collection,
        Self::Person,
        Self::PersonParents,
        Self::PersonChildren,
        Self::PersonSpouses,
        Self::Relationship,
        Self::Discussion,
        Self::Place,
        Self::User,
        Self::SourceDescription,
        Self::Agent,
        Self::PersonSearchResults,
        Self::PersonMatchResults,
        Self::PersonNonMatches,
        Self::PersonMerge,
        Self::ChangeHistory,
    ];

    /// Canonical type name used for name-based building.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Collection => "CollectionState",
            Self::Person => "PersonState",
            Self::PersonParents => "PersonParentsState",
            Self::PersonChildren => "PersonChildrenState",
            Self::PersonSpouses => "PersonSpousesState",
            Self::Relationship => "RelationshipState",
            Self::Discussion => "DiscussionState",
            Self::Place => "PlaceState",
            Self::User => "UserState",
            Self::SourceDescription => "SourceDescriptionState",
            Self::Agent => "AgentState",
            Self::PersonSearchResults => "PersonSearchResultsState",
            Self::PersonMatchResults => "PersonMatchResultsState",
            Self::PersonNonMatches => "PersonNonMatchesState",
            Self::PersonMerge => "PersonMergeState",
            Self::ChangeHistory => "ChangeHistoryState",
        }
    }

    /// Media type negotiated when no factory override applies.
    #[must_use]
    pub fn default_media_type(self) -> &'static str {
        match self {
            Self::PersonSearchResults | Self::PersonMatchResults | Self::ChangeHistory => {
                GEDCOMX_ATOM_JSON
            }
            _ => GEDCOMX_JSON,
        }
    }

    /// Parsing policy of the core profile.
    #[must_use]
    pub fn default_entity_policy(self) -> EntityPolicy {
        match self {
            Self::Person | Self::Relationship => EntityPolicy::Tombstone,
            _ => EntityPolicy::OnOk,
        }
    }

    /// Relations the core profile treats as embeddable.
    #[must_use]
    pub fn default_embedded_relations(self) -> &'static [&'static str] {
        match self {
            Self::Person => PERSON_RELATIONS,
            Self::Relationship => CONCLUSION_RELATIONS,
            Self::Discussion => &[rel::COMMENTS],
            _ => &[],
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateKind {
    type Err = StateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| StateError::unknown_state_type(name))
    }
}

/// Which exchanges carry a body worth parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPolicy {
    /// GET answered with 200.
    OnOk,
    /// GET answered with 200 or 410, or any method answered with 412.
    /// Deleted and conflicting resources still describe themselves.
    Tombstone,
}

impl EntityPolicy {
    #[must_use]
    pub fn should_parse(self, method: &Method, status: StatusCode) -> bool {
        let get = *method == Method::GET;
        match self {
            Self::OnOk => get && status == StatusCode::OK,
            Self::Tombstone => {
                (get && (status == StatusCode::OK || status == StatusCode::GONE))
                    || status == StatusCode::PRECONDITION_FAILED
            }
        }
    }
}

/// The shape of one resource type.
///
/// Implemented by uninhabited marker types; [`ApplicationState`] is generic
/// over it and consults it for the entity type, scope and the items scanned
/// for embedded links. Parsing policy and embeddable relations belong to the
/// [`StateProfile`](super::StateProfile) so a factory can replace them.
pub trait ResourceKind: Sized + Send + Sync + 'static {
    const KIND: StateKind;

    type Entity: DeserializeOwned + Serialize + Linked + fmt::Debug + Send + Sync + 'static;
    type Scope: fmt::Debug + ?Sized;

    /// The part of the entity that is "this resource"; `None` when the
    /// expected shape is missing.
    fn scope(entity: &Self::Entity) -> Option<&Self::Scope>;

    /// Links carried by the scope itself, consulted before entity links.
    fn scope_links(_entity: &Self::Entity) -> Option<&Links> {
        None
    }

    /// Link sets of every top-level item scanned for embedded resources.
    fn embedded_items(_entity: &Self::Entity) -> Vec<&Links> {
        Vec::new()
    }

    #[doc(hidden)]
    fn wrap(state: ApplicationState<Self>) -> AnyState;

    #[doc(hidden)]
    fn unwrap(state: AnyState) -> Result<ApplicationState<Self>, AnyState>;
}
