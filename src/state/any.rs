//! A state of any kind, produced by name-based building.

use reqwest::StatusCode;

use super::resources::{
    AgentState, ChangeHistoryState, CollectionState, DiscussionState, PersonChildrenState,
    PersonMatchResultsState, PersonMergeState, PersonNonMatchesState, PersonParentsState,
    PersonSearchResultsState, PersonSpousesState, PersonState, PlaceState, RelationshipState,
    SourceDescriptionState, UserState,
};
use super::{ApplicationState, ResourceKind, StateKind, StateProfile};
use crate::transport::{HttpRequest, HttpResponse};

/// One application state, kind known only at run time.
#[derive(Debug)]
pub enum AnyState {
    Collection(CollectionState),
    Person(PersonState),
    PersonParents(PersonParentsState),
    PersonChildren(PersonChildrenState),
    PersonSpouses(PersonSpousesState),
    Relationship(RelationshipState),
    Discussion(DiscussionState),
    Place(PlaceState),
    User(UserState),
    SourceDescription(SourceDescriptionState),
    Agent(AgentState),
    PersonSearchResults(PersonSearchResultsState),
    PersonMatchResults(PersonMatchResultsState),
    PersonNonMatches(PersonNonMatchesState),
    PersonMerge(PersonMergeState),
    ChangeHistory(ChangeHistoryState),
}

macro_rules! with_state {
    ($any:expr, $state:ident => $body:expr) => {
        match $any {
            AnyState::Collection($state) => $body,
            AnyState::Person($state) => $body,
            AnyState::PersonParents($state) => $body,
            AnyState::PersonChildren($state) => $body,
            AnyState::PersonSpouses($state) => $body,
            AnyState::Relationship($state) => $body,
            AnyState::Discussion($state) => $body,
            AnyState::Place($state) => $body,
            AnyState::User($state) => $body,
            AnyState::SourceDescription($state) => $body,
            AnyState::Agent($state) => $body,
            AnyState::PersonSearchResults($state) => $body,
            AnyState::PersonMatchResults($state) => $body,
            AnyState::PersonNonMatches($state) => $body,
            AnyState::PersonMerge($state) => $body,
            AnyState::ChangeHistory($state) => $body,
        }
    };
}

impl AnyState {
    #[must_use]
    pub fn kind(&self) -> StateKind {
        with_state!(self, s => s.kind())
    }

    #[must_use]
    pub fn profile(&self) -> &StateProfile {
        with_state!(self, s => s.profile())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        with_state!(self, s => s.status())
    }

    #[must_use]
    pub fn request(&self) -> &HttpRequest {
        with_state!(self, s => s.request())
    }

    #[must_use]
    pub fn response(&self) -> &HttpResponse {
        with_state!(self, s => s.response())
    }

    /// Recovers the typed state, or gives `self` back if the kind differs.
    ///
    /// # Errors
    ///
    /// Returns the untouched `AnyState` when it is not of kind `K`.
    pub fn downcast<K: ResourceKind>(self) -> Result<ApplicationState<K>, Self> {
        K::unwrap(self)
    }
}

impl<K: ResourceKind> From<ApplicationState<K>> for AnyState {
    fn from(state: ApplicationState<K>) -> Self {
        K::wrap(state)
    }
}
