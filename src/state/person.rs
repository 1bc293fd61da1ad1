//! Person and relationship transitions.

use reqwest::Method;

use super::resources::{
    CollectionResource, CollectionState, DiscussionResource, DiscussionState,
    PersonChildrenResource, PersonChildrenState, PersonParentsResource, PersonParentsState,
    PersonResource, PersonSpousesResource, PersonSpousesState, PersonState, RelationshipResource,
    RelationshipState,
};
use super::StateError;
use crate::link::{Link, TemplateVars, rel};
use crate::model::{Gedcomx, Person, ResourceReference};
use crate::modifier::RequestModifier;

impl PersonState {
    /// The collection the person belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_collection(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<CollectionState>, StateError> {
        self.follow::<CollectionResource>(Method::GET, rel::COLLECTION, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_parents(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonParentsState>, StateError> {
        self.follow::<PersonParentsResource>(Method::GET, rel::PARENTS, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_children(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonChildrenState>, StateError> {
        self.follow::<PersonChildrenResource>(Method::GET, rel::CHILDREN, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_spouses(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonSpousesState>, StateError> {
        self.follow::<PersonSpousesResource>(Method::GET, rel::SPOUSES, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// Every relationship of the person; scope is the first one.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_relationships(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<RelationshipState>, StateError> {
        self.follow::<RelationshipResource>(
            Method::GET,
            rel::RELATIONSHIPS,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Posts a changed person back to the resource.
    ///
    /// Pass [`preconditions`](super::ApplicationState::preconditions) to
    /// make the update conditional; a stale copy then yields a 412 state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn update(
        &self,
        person: Person,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<PersonState, StateError> {
        self.post(&Gedcomx::with_person(person), modifiers).await
    }

    /// Discussions referenced by the person.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_discussions(
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
}

impl RelationshipState {
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_person1(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let reference = self.scope()?.and_then(|r| r.person1.clone());
        self.read_member(rel::PERSON1, reference, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_person2(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let reference = self.scope()?.and_then(|r| r.person2.clone());
        self.read_member(rel::PERSON2, reference, modifiers).await
    }

    /// Follows the member link, else the member reference when it is a
    /// real URI rather than a local `#id` fragment.
    async fn read_member(
        &self,
        member_rel: &str,
        reference: Option<ResourceReference>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let link = match self.link(member_rel)? {
            Some(link) => link,
            None => match reference {
                Some(r) if !r.resource.starts_with('#') => Link::with_href(member_rel, r.resource),
                _ => return Ok(None),
            },
        };
        self.follow_link::<PersonResource>(&link, Method::GET, &TemplateVars::new(), None, modifiers)
            .await
    }
}
