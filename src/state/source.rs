//! Source description transitions.

use reqwest::Method;

use super::StateError;
use super::resources::{AgentResource, AgentState, SourceDescriptionState};
use crate::link::{TemplateVars, rel};
use crate::modifier::RequestModifier;

impl SourceDescriptionState {
    /// The agent (repository, author) behind the source.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_agent(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<AgentState>, StateError> {
        self.follow::<AgentResource>(Method::GET, rel::AGENT, &TemplateVars::new(), None, modifiers)
            .await
    }
}
