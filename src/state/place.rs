//! Place transitions.

use reqwest::Method;

use super::StateError;
use super::resources::{PlaceResource, PlaceState};
use crate::link::{TemplateVars, rel};
use crate::modifier::RequestModifier;

impl PlaceState {
    /// The full description behind a place reference.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_description(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PlaceState>, StateError> {
        self.follow::<PlaceResource>(Method::GET, rel::DESCRIPTION, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// Places contained in this one; scope is the first child.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_children(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PlaceState>, StateError> {
        self.follow::<PlaceResource>(Method::GET, rel::CHILDREN, &TemplateVars::new(), None, modifiers)
            .await
    }
}
