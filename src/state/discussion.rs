//! Discussion transitions.

use reqwest::Method;

use super::StateError;
use super::application::to_body;
use super::resources::{DiscussionResource, DiscussionState};
use crate::link::{TemplateVars, rel};
use crate::model::{Comment, Discussion, Gedcomx};
use crate::modifier::RequestModifier;

impl DiscussionState {
    /// The comments of the discussion, as a discussion whose `comments`
    /// are populated.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_comments(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<DiscussionState>, StateError> {
        self.follow::<DiscussionResource>(
            Method::GET,
            rel::COMMENTS,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Adds a comment through the `comments` relation of this discussion.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn add_comment(
        &self,
        comment: Comment,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<DiscussionState>, StateError> {
        let body = to_body(&Gedcomx::with_discussion(Discussion {
            comments: vec![comment],
            ..Discussion::default()
        }))?;
        self.follow::<DiscussionResource>(
            Method::POST,
            rel::COMMENTS,
            &TemplateVars::new(),
            Some(body),
            modifiers,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn update(
        &self,
        discussion: Discussion,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<DiscussionState, StateError> {
        self.post(&Gedcomx::with_discussion(discussion), modifiers).await
    }
}
