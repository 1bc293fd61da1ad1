//! Family-tree operations: duplicates, merges, restores and change history.
//!
//! Person-level entry points only act on persons whose profile enables
//! [`TREE_OPERATIONS`]; elsewhere they answer `Ok(None)` without I/O.

use reqwest::Method;
use tracing::{debug, info, instrument};

use super::TREE_OPERATIONS;
use crate::link::{Link, TemplateVars, rel};
use crate::model::{Entry, Gedcomx, Merge, MergeAnalysis, Person, ResourceReference};
use crate::modifier::RequestModifier;
use crate::state::{
    ChangeHistoryResource, ChangeHistoryState, PersonMatchResultsResource,
    PersonMatchResultsState, PersonMergeResource, PersonMergeState, PersonNonMatchesResource,
    PersonNonMatchesState, PersonResource, PersonState, StateError, to_body,
};

fn non_match_body(person_id: &str) -> Result<Vec<u8>, StateError> {
    if person_id.trim().is_empty() {
        return Err(StateError::invalid_argument("person id must not be empty"));
    }
    to_body(&Gedcomx::with_person(Person {
        id: Some(person_id.to_string()),
        ..Person::default()
    }))
}

fn tree_enabled(person: &PersonState) -> bool {
    let enabled = person.profile().supports(TREE_OPERATIONS);
    if !enabled {
        debug!(
            variant = %person.profile().variant,
            "family-tree operations not enabled for this person"
        );
    }
    enabled
}

impl PersonState {
    /// Possible duplicates of this person.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_matches(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonMatchResultsState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        self.follow::<PersonMatchResultsResource>(
            Method::GET,
            rel::MATCHES,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Persons already declared not to be duplicates of this one.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_non_matches(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonNonMatchesState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        self.follow::<PersonNonMatchesResource>(
            Method::GET,
            rel::NOT_A_MATCHES,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }

    /// Declares `person_id` not a duplicate of this person.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] for an empty id, and
    /// [`StateError`] on transport failure or an error status.
    #[instrument(skip(self, modifiers))]
    pub async fn add_non_match(
        &self,
        person_id: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonNonMatchesState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        let body = non_match_body(person_id)?;
        self.follow::<PersonNonMatchesResource>(
            Method::POST,
            rel::NOT_A_MATCHES,
            &TemplateVars::new(),
            Some(body),
            modifiers,
        )
        .await
    }

    /// The merge analysis of this person (survivor) with `duplicate_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] for an empty id, and
    /// [`StateError`] on transport failure or an error status.
    #[instrument(skip(self, modifiers))]
    pub async fn read_merge(
        &self,
        duplicate_id: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonMergeState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        if duplicate_id.trim().is_empty() {
            return Err(StateError::invalid_argument("duplicate id must not be empty"));
        }
        let vars = TemplateVars::new().with("did", duplicate_id);
        self.follow::<PersonMergeResource>(Method::GET, rel::MERGE, &vars, None, modifiers)
            .await
    }

    /// Restores a deleted person. Only a tombstone advertises `restore`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn restore(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        self.follow::<PersonResource>(Method::POST, rel::RESTORE, &TemplateVars::new(), None, modifiers)
            .await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_change_history(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<ChangeHistoryState>, StateError> {
        if !tree_enabled(self) {
            return Ok(None);
        }
        self.follow::<ChangeHistoryResource>(
            Method::GET,
            rel::CHANGE_HISTORY,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }
}

impl PersonMatchResultsState {
    /// Declares the person of `entry` not a duplicate, through the feed's
    /// `non-matches` relation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] if the entry has no id, and
    /// [`StateError`] on transport failure or an error status.
    pub async fn add_non_match(
        &self,
        entry: &Entry,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonNonMatchesState>, StateError> {
        let Some(id) = entry.id.as_deref() else {
            return Err(StateError::invalid_argument("match entry has no person id"));
        };
        let body = non_match_body(id)?;
        self.follow::<PersonNonMatchesResource>(
            Method::POST,
            rel::NOT_A_MATCHES,
            &TemplateVars::new(),
            Some(body),
            modifiers,
        )
        .await
    }
}

impl PersonMergeState {
    /// Whether the server would accept a merge of this pair.
    ///
    /// Sends `OPTIONS` to the merge resource and looks for `POST` in `Allow`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn is_allowed(&self, modifiers: &[&dyn RequestModifier]) -> Result<bool, StateError> {
        let options = self.options(modifiers).await?;
        Ok(options
            .response()
            .allowed_methods()
            .iter()
            .any(|method| method == Method::POST.as_str()))
    }

    /// Performs the merge.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    #[instrument(skip_all, fields(uri = %self.uri()))]
    pub async fn merge(
        &self,
        merge: Merge,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<PersonMergeState, StateError> {
        let payload = Gedcomx {
            merges: vec![merge],
            ..Gedcomx::default()
        };
        let merged = self.post(&payload, modifiers).await?;
        info!(status = merged.status().as_u16(), "merge submitted");
        Ok(merged)
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_survivor(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let reference = self.analysis_reference(|a| a.survivor.as_ref())?;
        self.read_analysis_person(reference, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_duplicate(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let reference = self.analysis_reference(|a| a.duplicate.as_ref())?;
        self.read_analysis_person(reference, modifiers).await
    }

    fn analysis_reference(
        &self,
        pick: impl Fn(&MergeAnalysis) -> Option<&ResourceReference>,
    ) -> Result<Option<ResourceReference>, StateError> {
        Ok(self
            .scope()?
            .and_then(|entity| entity.merge_analyses.first())
            .and_then(pick)
            .cloned())
    }

    async fn read_analysis_person(
        &self,
        reference: Option<ResourceReference>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<PersonState>, StateError> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        let link = Link::with_href(rel::PERSON, reference.resource);
        self.follow_link::<PersonResource>(&link, Method::GET, &TemplateVars::new(), None, modifiers)
            .await
    }
}

impl ChangeHistoryState {
    /// Reverts the change described by `entry`.
    ///
    /// `Ok(None)` when the entry offers no `restore` relation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn restore_change(
        &self,
        entry: &Entry,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<ChangeHistoryState>, StateError> {
        let Some(link) = entry.links.get(rel::RESTORE) else {
            return Ok(None);
        };
        self.follow_link::<ChangeHistoryResource>(
            link,
            Method::POST,
            &TemplateVars::new(),
            None,
            modifiers,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use reqwest::header::{ACCEPT, ALLOW, HeaderValue};
    use url::Url;

    use super::*;
    use crate::GedcomxClient;
    use crate::config::ClientConfig;
    use crate::familysearch::{FAMILYSEARCH_VARIANT, factory};
    use crate::model::{FAMILYSEARCH_JSON, GEDCOMX_ATOM_JSON};
    use crate::test_support::{StubTransport, client_with, json_response};
    use crate::transport::{HttpRequest, HttpResponse};

    const PERSON_URI: &str = "https://api.example.com/platform/tree/persons/P1";

    fn fs_client(stub: &Arc<StubTransport>) -> GedcomxClient {
        GedcomxClient::with_transport(&ClientConfig::default(), stub.clone(), Arc::new(factory()))
            .unwrap()
    }

    fn person(stub: &Arc<StubTransport>, status: StatusCode) -> PersonState {
        fs_client(stub)
            .build::<PersonResource>(
                HttpRequest::new(Method::GET, Url::parse(PERSON_URI).unwrap()),
                json_response(status, &tree_person_body()),
                None,
            )
            .unwrap()
    }

    fn tree_person_body() -> String {
        serde_json::json!({
            "persons": [{
                "id": "P1",
                "links": {
                    "self": {"href": PERSON_URI},
                    "matches": {"href": "https://api.example.com/platform/tree/persons/P1/matches"},
                    "non-matches": {"href": "https://api.example.com/platform/tree/persons/P1/not-a-matches"},
                    "merge": {"template": "https://api.example.com/platform/tree/persons/P1/merges/{did}"},
                    "restore": {"href": "https://api.example.com/platform/tree/persons/P1/restore"},
                    "change-history": {"href": "https://api.example.com/platform/tree/persons/P1/changes"}
                }
            }]
        })
        .to_string()
    }

    fn merge_state(stub: &Arc<StubTransport>) -> PersonMergeState {
        fs_client(stub)
            .build::<PersonMergeResource>(
                HttpRequest::new(
                    Method::GET,
                    Url::parse("https://api.example.com/platform/tree/persons/P1/merges/P2").unwrap(),
                ),
                json_response(
                    StatusCode::OK,
                    r#"{"mergeAnalyses": [{
                        "survivor": {"resource": "/platform/tree/persons/P1"},
                        "duplicate": {"resource": "/platform/tree/persons/P2"}
                    }]}"#,
                ),
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_person_uses_familysearch_profile() {
        let stub = Arc::new(StubTransport::default());
        let state = person(&stub, StatusCode::OK);
        assert_eq!(state.profile().variant, FAMILYSEARCH_VARIANT);
        assert_eq!(state.profile().media_type, FAMILYSEARCH_JSON);
    }

    #[tokio::test]
    async fn test_core_person_has_no_tree_operations() {
        let stub = Arc::new(StubTransport::default());
        let core = client_with(stub.clone())
            .build::<PersonResource>(
                HttpRequest::new(Method::GET, Url::parse(PERSON_URI).unwrap()),
                json_response(StatusCode::OK, &tree_person_body()),
                None,
            )
            .unwrap();
        assert!(core.has_link(rel::MATCHES).unwrap());

        assert!(core.read_matches(&[]).await.unwrap().is_none());
        assert!(core.read_non_matches(&[]).await.unwrap().is_none());
        assert!(core.add_non_match("P2", &[]).await.unwrap().is_none());
        assert!(core.read_merge("P2", &[]).await.unwrap().is_none());
        assert!(core.restore(&[]).await.unwrap().is_none());
        assert!(core.read_change_history(&[]).await.unwrap().is_none());
        assert_eq!(stub.request_count(), 0);
    }

    #[tokio::test]
    async fn test_read_matches_negotiates_atom() {
        let stub = Arc::new(StubTransport::default());
        stub.push(json_response(
            StatusCode::OK,
            r#"{"entries": [{"id": "P2", "score": 0.9}]}"#,
        ));
        let matches = person(&stub, StatusCode::OK)
            .read_matches(&[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(matches.scope().unwrap().unwrap().len(), 1);
        assert_eq!(stub.requests()[0].header_str(ACCEPT), Some(GEDCOMX_ATOM_JSON));
    }

    #[tokio::test]
    async fn test_add_non_match_from_match_entry() {
        let stub = Arc::new(StubTransport::default());
        let matches = fs_client(&stub)
            .build::<PersonMatchResultsResource>(
                HttpRequest::new(
                    Method::GET,
                    Url::parse("https://api.example.com/platform/tree/persons/P1/matches").unwrap(),
                ),
                json_response(
                    StatusCode::OK,
                    r#"{"entries": [{"id": "P2"}, {"title": "no id"}],
                        "links": {"non-matches": {"href": "/platform/tree/persons/P1/not-a-matches"}}}"#,
                ),
                None,
            )
            .unwrap();
        let entries = matches.scope().unwrap().unwrap().to_vec();

        stub.push(HttpResponse::new(StatusCode::NO_CONTENT));
        let result = matches.add_non_match(&entries[0], &[]).await.unwrap().unwrap();
        assert_eq!(result.kind(), crate::state::StateKind::PersonNonMatches);
        let sent = &stub.requests()[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(
            sent.uri.as_str(),
            "https://api.example.com/platform/tree/persons/P1/not-a-matches"
        );
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["persons"][0]["id"], "P2");

        let err = matches.add_non_match(&entries[1], &[]).await.unwrap_err();
        assert!(err.is_caller_error());
        assert_eq!(stub.request_count(), 1);
    }

    #[tokio::test]
    async fn test_read_merge_expands_duplicate_id() {
        let stub = Arc::new(StubTransport::default());
        stub.push(json_response(StatusCode::OK, r#"{"mergeAnalyses": [{}]}"#));
        let state = person(&stub, StatusCode::OK);
        state.read_merge("P2", &[]).await.unwrap().unwrap();
        assert_eq!(
            stub.requests()[0].uri.as_str(),
            "https://api.example.com/platform/tree/persons/P1/merges/P2"
        );
        assert!(state.read_merge(" ", &[]).await.unwrap_err().is_caller_error());
    }

    #[tokio::test]
    async fn test_restore_from_tombstone() {
        let stub = Arc::new(StubTransport::default());
        stub.push(HttpResponse::new(StatusCode::NO_CONTENT));
        let deleted = person(&stub, StatusCode::GONE);
        let restored = deleted.restore(&[]).await.unwrap().unwrap();
        assert_eq!(restored.status(), StatusCode::NO_CONTENT);
        let sent = &stub.requests()[0];
        assert_eq!(sent.method, Method::POST);
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn test_merge_is_allowed_checks_allow_header() {
        let stub = Arc::new(StubTransport::default());
        stub.push(
            HttpResponse::new(StatusCode::OK)
                .with_header(ALLOW, HeaderValue::from_static("OPTIONS, GET, POST")),
        );
        stub.push(HttpResponse::new(StatusCode::OK).with_header(ALLOW, HeaderValue::from_static("GET")));
        let state = merge_state(&stub);
        assert!(state.is_allowed(&[]).await.unwrap());
        assert!(!state.is_allowed(&[]).await.unwrap());
        assert_eq!(stub.requests()[0].method, Method::OPTIONS);
    }

    #[tokio::test]
    async fn test_merge_posts_payload() {
        let stub = Arc::new(StubTransport::default());
        stub.push(HttpResponse::new(StatusCode::NO_CONTENT));
        let merge = Merge {
            resources_to_copy: vec![ResourceReference::new("#name-1")],
            ..Merge::default()
        };
        merge_state(&stub).merge(merge, &[]).await.unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(stub.requests()[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["merges"][0]["resourcesToCopy"][0]["resource"], "#name-1");
    }

    #[tokio::test]
    async fn test_read_survivor_and_duplicate() {
        let stub = Arc::new(StubTransport::default());
        stub.push(json_response(StatusCode::OK, r#"{"persons": [{"id": "P1"}]}"#));
        stub.push(json_response(StatusCode::OK, r#"{"persons": [{"id": "P2"}]}"#));
        let state = merge_state(&stub);

        let survivor = state.read_survivor(&[]).await.unwrap().unwrap();
        let duplicate = state.read_duplicate(&[]).await.unwrap().unwrap();
        assert_eq!(survivor.scope().unwrap().unwrap().id.as_deref(), Some("P1"));
        assert_eq!(duplicate.scope().unwrap().unwrap().id.as_deref(), Some("P2"));
        assert_eq!(
            stub.requests()[1].uri.as_str(),
            "https://api.example.com/platform/tree/persons/P2"
        );
        assert_eq!(stub.requests()[1].header_str(ACCEPT), Some(FAMILYSEARCH_JSON));
    }

    #[tokio::test]
    async fn test_restore_change() {
        let stub = Arc::new(StubTransport::default());
        stub.push(json_response(
            StatusCode::OK,
            r#"{"entries": [
                {"id": "C1", "links": {"restore": {"href": "/platform/tree/changes/C1/restore"}}},
                {"id": "C2"}
            ]}"#,
        ));
        let history = person(&stub, StatusCode::OK)
            .read_change_history(&[])
            .await
            .unwrap()
            .unwrap();
        let entries = history.scope().unwrap().unwrap().to_vec();

        stub.push(HttpResponse::new(StatusCode::NO_CONTENT));
        let restored = history.restore_change(&entries[0], &[]).await.unwrap().unwrap();
        assert_eq!(restored.kind(), crate::state::StateKind::ChangeHistory);
        assert_eq!(
            stub.requests()[1].uri.as_str(),
            "https://api.example.com/platform/tree/changes/C1/restore"
        );
        assert!(history.restore_change(&entries[1], &[]).await.unwrap().is_none());
        assert_eq!(stub.request_count(), 2);
    }
}
