//! User transitions.

use reqwest::Method;

use super::StateError;
use super::resources::{PersonResource, PersonState, UserState};
use crate::link::{TemplateVars, rel};
use crate::modifier::RequestModifier;

impl UserState {
    /// The tree person linked to this user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_person(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        self.follow::<PersonResource>(Method::GET, rel::PERSON, &TemplateVars::new(), None, modifiers)
            .await
    }
}
