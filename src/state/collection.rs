//! Collection transitions: the usual entry point of a navigation chain.

use reqwest::Method;
use tracing::instrument;

use super::application::to_body;
use super::resources::{
    CollectionResource, CollectionState, DiscussionResource, DiscussionState,
    PersonResource, PersonSearchResultsResource, PersonSearchResultsState, PersonState,
    PlaceResource, PlaceState, SourceDescriptionResource, SourceDescriptionState, UserResource,
    UserState,
};
use super::StateError;
use crate::link::{TemplateVars, rel};
use crate::model::{Discussion, Gedcomx, Person};
use crate::modifier::RequestModifier;

impl CollectionState {
    /// The authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_current_user(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<UserState>, StateError> {
        self.follow::<UserResource>(Method::GET, rel::CURRENT_USER, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// The tree person of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_current_user_person(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        self.follow::<PersonResource>(
            Method::GET,
            rel::CURRENT_USER_PERSON,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// A person by id, through the collection's `person` template.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] for an empty id, and
    /// [`StateError`] on transport failure or an error status.
    #[instrument(skip(self, modifiers))]
    pub async fn read_person_by_id(
        &self,
        id: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        require_id(id)?;
        let vars = TemplateVars::new().with("pid", id);
        self.follow::<PersonResource>(Method::GET, rel::PERSON, &vars, None, modifiers)
            .await
    }

    /// A place by id, through the collection's `place` template.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] for an empty id, and
    /// [`StateError`] on transport failure or an error status.
    pub async fn read_place_by_id(
        &self,
        id: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PlaceState>, StateError> {
        require_id(id)?;
        let vars = TemplateVars::new().with("pid", id);
        self.follow::<PlaceResource>(Method::GET, rel::PLACE, &vars, None, modifiers)
            .await
    }

    /// Runs a person search, e.g. `givenName:John surname:Smith`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] for an empty query, and
    /// [`StateError`] on transport failure or an error status.
    #[instrument(skip(self, modifiers))]
    pub async fn search_for_persons(
        &self,
        query: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonSearchResultsState>, StateError> {
        if query.trim().is_empty() {
            return Err(StateError::invalid_argument("search query must not be empty"));
        }
        let vars = TemplateVars::new().with("q", query);
        self.follow::<PersonSearchResultsResource>(
            Method::GET,
            rel::PERSON_SEARCH,
            &vars,
            None,
            modifiers,
        )
        .await
    }

    /// Creates a person. The result is the 201 exchange; its
    /// [`self_uri`](super::ApplicationState::self_uri) points at the new person.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn add_person(
        &self,
        person: Person,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let body = to_body(&Gedcomx::with_person(person))?;
        self.follow::<PersonResource>(
            Method::POST,
            rel::PERSONS,
            &TemplateVars::new(),
            Some(body),
            modifiers,
        )
        .await
    }

    /// The discussions of the collection; scope is the first discussion.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_discussions_collection(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<DiscussionState>, StateError> {
        self.follow::<DiscussionResource>(
            Method::GET,
            rel::DISCUSSIONS,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Creates a discussion.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn add_discussion(
        &self,
        discussion: Discussion,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<DiscussionState>, StateError> {
        let body = to_body(&Gedcomx::with_discussion(discussion))?;
        self.follow::<DiscussionResource>(
            Method::POST,
            rel::DISCUSSIONS,
            &TemplateVars::new(),
            Some(body),
            modifiers,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_source_descriptions(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<SourceDescriptionState>, StateError> {
        self.follow::<SourceDescriptionResource>(
            Method::GET,
            rel::SOURCE_DESCRIPTIONS,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Subcollections of this collection.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_subcollections(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<CollectionState>, StateError> {
        self.follow::<CollectionResource>(
            Method::GET,
            rel::SUBCOLLECTIONS,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }
}

fn require_id(id: &str) -> Result<(), StateError> {
    if id.trim().is_empty() {
        return Err(StateError::invalid_argument("resource id must not be empty"));
    }
    Ok(())
}
