//! Transitions out of search and match feeds.

use reqwest::Method;

use super::resources::{
    PersonMatchResultsState, PersonResource, PersonSearchResultsState, PersonState,
};
use super::{ApplicationState, ResourceKind, StateError};
use crate::link::{TemplateVars, rel};
use crate::model::Entry;
use crate::modifier::RequestModifier;

impl PersonSearchResultsState {
    /// The person behind one search hit.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_person(
        &self,
        entry: &Entry,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        read_entry_person(self, entry, modifiers).await
    }
}

impl PersonMatchResultsState {
    /// The person behind one possible duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_person(
        &self,
        entry: &Entry,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        read_entry_person(self, entry, modifiers).await
    }
}

/// Entries point at their person with `person`, falling back to `self`.
async fn read_entry_person<K: ResourceKind>(
    state: &ApplicationState<K>,
    entry: &Entry,
    modifiers: &[&dyn RequestModifier],
) -> Result<Option<PersonState>, StateError> {
    let Some(link) = entry
        .links
        .get(rel::PERSON)
        .or_else(|| entry.links.get(rel::SELF))
    else {
        return Ok(None);
    };
    state
        .follow_link::<PersonResource>(link, Method::GET, &TemplateVars::new(), None, modifiers)
        .await
}
