//! Resource types: what each kind parses, its scope and embeddable relations.

use super::{AnyState, ApplicationState, ResourceKind, StateKind};
use crate::link::Links;
use crate::model::{
    Agent, Collection, Discussion, Entry, Feed, Gedcomx, Linked, Person, PlaceDescription,
    Relationship, SourceDescription, User,
};

macro_rules! any_state_variant {
    ($variant:ident) => {
        fn wrap(state: ApplicationState<Self>) -> AnyState {
            AnyState::$variant(state)
        }

        fn unwrap(state: AnyState) -> Result<ApplicationState<Self>, AnyState> {
            match state {
                AnyState::$variant(state) => Ok(state),
                other => Err(other),
            }
        }
    };
}

macro_rules! linked_scope {
    () => {
        fn scope_links(entity: &Self::Entity) -> Option<&Links> {
            Self::scope(entity).map(Linked::links)
        }
    };
}

/// Feed scopes are the entries; an empty page has none.
fn feed_entries(feed: &Feed) -> Option<&[Entry]> {
    (!feed.entries.is_empty()).then_some(feed.entries.as_slice())
}

fn person_and_relationship_links(entity: &Gedcomx) -> Vec<&Links> {
    entity
        .persons
        .iter()
        .map(Linked::links)
        .chain(entity.relationships.iter().map(Linked::links))
        .collect()
}

/// A collection; scope is the first collection.
pub enum CollectionResource {}

impl ResourceKind for CollectionResource {
    const KIND: StateKind = StateKind::Collection;
    type Entity = Gedcomx;
    type Scope = Collection;

    fn scope(entity: &Gedcomx) -> Option<&Collection> {
        entity.collections.first()
    }

    linked_scope!();

    any_state_variant!(Collection);
}

/// A person; scope is the first person. Deleted persons keep their body.
pub enum PersonResource {}

impl ResourceKind for PersonResource {
    const KIND: StateKind = StateKind::Person;
    type Entity = Gedcomx;
    type Scope = Person;

    fn scope(entity: &Gedcomx) -> Option<&Person> {
        entity.persons.first()
    }

    fn embedded_items(entity: &Gedcomx) -> Vec<&Links> {
        person_and_relationship_links(entity)
    }

    linked_scope!();

    any_state_variant!(Person);
}

/// The parents of a person, with the relationships linking them.
pub enum PersonParentsResource {}

impl ResourceKind for PersonParentsResource {
    const KIND: StateKind = StateKind::PersonParents;
    type Entity = Gedcomx;
    type Scope = Gedcomx;

    fn scope(entity: &Gedcomx) -> Option<&Gedcomx> {
        Some(entity)
    }

    linked_scope!();

    any_state_variant!(PersonParents);
}

pub enum PersonChildrenResource {}

impl ResourceKind for PersonChildrenResource {
    const KIND: StateKind = StateKind::PersonChildren;
    type Entity = Gedcomx;
    type Scope = Gedcomx;

    fn scope(entity: &Gedcomx) -> Option<&Gedcomx> {
        Some(entity)
    }

    linked_scope!();

    any_state_variant!(PersonChildren);
}

pub enum PersonSpousesResource {}

impl ResourceKind for PersonSpousesResource {
    const KIND: StateKind = StateKind::PersonSpouses;
    type Entity = Gedcomx;
    type Scope = Gedcomx;

    fn scope(entity: &Gedcomx) -> Option<&Gedcomx> {
        Some(entity)
    }

    linked_scope!();

    any_state_variant!(PersonSpouses);
}

/// A relationship; scope is the first relationship.
pub enum RelationshipResource {}

impl ResourceKind for RelationshipResource {
    const KIND: StateKind = StateKind::Relationship;
    type Entity = Gedcomx;
    type Scope = Relationship;

    fn scope(entity: &Gedcomx) -> Option<&Relationship> {
        entity.relationships.first()
    }

    fn embedded_items(entity: &Gedcomx) -> Vec<&Links> {
        entity.relationships.iter().map(Linked::links).collect()
    }

    linked_scope!();

    any_state_variant!(Relationship);
}

/// A discussion; scope is the first discussion.
pub enum DiscussionResource {}

impl ResourceKind for DiscussionResource {
    const KIND: StateKind = StateKind::Discussion;
    type Entity = Gedcomx;
    type Scope = Discussion;

    fn scope(entity: &Gedcomx) -> Option<&Discussion> {
        entity.discussions.first()
    }

    fn embedded_items(entity: &Gedcomx) -> Vec<&Links> {
        entity.discussions.iter().map(Linked::links).collect()
    }

    linked_scope!();

    any_state_variant!(Discussion);
}

pub enum PlaceResource {}

impl ResourceKind for PlaceResource {
    const KIND: StateKind = StateKind::Place;
    type Entity = Gedcomx;
    type Scope = PlaceDescription;

    fn scope(entity: &Gedcomx) -> Option<&PlaceDescription> {
        entity.places.first()
    }

    linked_scope!();

    any_state_variant!(Place);
}

pub enum UserResource {}

impl ResourceKind for UserResource {
    const KIND: StateKind = StateKind::User;
    type Entity = Gedcomx;
    type Scope = User;

    fn scope(entity: &Gedcomx) -> Option<&User> {
        entity.users.first()
    }

    linked_scope!();

    any_state_variant!(User);
}

pub enum SourceDescriptionResource {}

impl ResourceKind for SourceDescriptionResource {
    const KIND: StateKind = StateKind::SourceDescription;
    type Entity = Gedcomx;
    type Scope = SourceDescription;

    fn scope(entity: &Gedcomx) -> Option<&SourceDescription> {
        entity.source_descriptions.first()
    }

    linked_scope!();

    any_state_variant!(SourceDescription);
}

pub enum AgentResource {}

impl ResourceKind for AgentResource {
    const KIND: StateKind = StateKind::Agent;
    type Entity = Gedcomx;
    type Scope = Agent;

    fn scope(entity: &Gedcomx) -> Option<&Agent> {
        entity.agents.first()
    }

    linked_scope!();

    any_state_variant!(Agent);
}

/// A page of person search hits.
pub enum PersonSearchResultsResource {}

impl ResourceKind for PersonSearchResultsResource {
    const KIND: StateKind = StateKind::PersonSearchResults;
    type Entity = Feed;
    type Scope = [Entry];

    fn scope(entity: &Feed) -> Option<&[Entry]> {
        feed_entries(entity)
    }

    any_state_variant!(PersonSearchResults);
}

/// Possible duplicates of a person.
pub enum PersonMatchResultsResource {}

impl ResourceKind for PersonMatchResultsResource {
    const KIND: StateKind = StateKind::PersonMatchResults;
    type Entity = Feed;
    type Scope = [Entry];

    fn scope(entity: &Feed) -> Option<&[Entry]> {
        feed_entries(entity)
    }

    any_state_variant!(PersonMatchResults);
}

/// Persons declared not to be duplicates.
pub enum PersonNonMatchesResource {}

impl ResourceKind for PersonNonMatchesResource {
    const KIND: StateKind = StateKind::PersonNonMatches;
    type Entity = Gedcomx;
    type Scope = Gedcomx;

    fn scope(entity: &Gedcomx) -> Option<&Gedcomx> {
        Some(entity)
    }

    linked_scope!();

    any_state_variant!(PersonNonMatches);
}

/// A merge analysis between a survivor and a duplicate.
pub enum PersonMergeResource {}

impl ResourceKind for PersonMergeResource {
    const KIND: StateKind = StateKind::PersonMerge;
    type Entity = Gedcomx;
    type Scope = Gedcomx;

    fn scope(entity: &Gedcomx) -> Option<&Gedcomx> {
        Some(entity)
    }

    linked_scope!();

    any_state_variant!(PersonMerge);
}

pub enum ChangeHistoryResource {}

impl ResourceKind for ChangeHistoryResource {
    const KIND: StateKind = StateKind::ChangeHistory;
    type Entity = Feed;
    type Scope = [Entry];

    fn scope(entity: &Feed) -> Option<&[Entry]> {
        feed_entries(entity)
    }

    any_state_variant!(ChangeHistory);
}

pub type CollectionState = ApplicationState<CollectionResource>;
pub type PersonState = ApplicationState<PersonResource>;
pub type PersonParentsState = ApplicationState<PersonParentsResource>;
pub type PersonChildrenState = ApplicationState<PersonChildrenResource>;
pub type PersonSpousesState = ApplicationState<PersonSpousesResource>;
pub type RelationshipState = ApplicationState<RelationshipResource>;
pub type DiscussionState = ApplicationState<DiscussionResource>;
pub type PlaceState = ApplicationState<PlaceResource>;
pub type UserState = ApplicationState<UserResource>;
pub type SourceDescriptionState = ApplicationState<SourceDescriptionResource>;
pub type AgentState = ApplicationState<AgentResource>;
pub type PersonSearchResultsState = ApplicationState<PersonSearchResultsResource>;
pub type PersonMatchResultsState = ApplicationState<PersonMatchResultsResource>;
pub type PersonNonMatchesState = ApplicationState<PersonNonMatchesResource>;
pub type PersonMergeState = ApplicationState<PersonMergeResource>;
pub type ChangeHistoryState = ApplicationState<ChangeHistoryResource>;
