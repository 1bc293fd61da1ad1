//! Embedded-resource discovery and batch loading.
//!
//! Top-level items of an entity (each person, each relationship, ...) may
//! link to sub-resources the server did not inline: conclusions, notes,
//! source references and the like. Discovery is a pure scan; loading sends
//! one GET per discovered link, concurrently, as a single operation.

use futures_util::future::try_join_all;
use reqwest::Method;
use tracing::{debug, instrument};

use super::{ApplicationState, ResourceKind, StateError};
use crate::link::{Link, TemplateVars};
use crate::model::Gedcomx;
use crate::modifier::{RequestModifier, apply_all};
use crate::transport::{HttpRequest, HttpResponse};

/// One loaded sub-resource.
#[derive(Debug, Clone)]
pub struct EmbeddedResource {
    pub link: Link,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

impl EmbeddedResource {
    /// Parses the body of a 200 response.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::EntityParse`] if the body is not GEDCOM X JSON.
    pub fn gedcomx(&self) -> Result<Option<Gedcomx>, StateError> {
        if self.response.status != reqwest::StatusCode::OK || !self.response.has_body() {
            return Ok(None);
        }
        serde_json::from_slice(&self.response.body)
            .map(Some)
            .map_err(|e| StateError::entity_parse(self.request.uri.as_str(), e.to_string()))
    }
}

impl<K: ResourceKind> ApplicationState<K> {
    /// Links to embeddable sub-resources of every top-level item.
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// Propagates [`StateError::EntityParse`].
    pub fn embedded_links(&self) -> Result<Vec<Link>, StateError> {
        let Some(entity) = self.entity()? else {
            return Ok(Vec::new());
        };
        let relations = &self.profile().embedded_relations;
        Ok(K::embedded_items(entity)
            .into_iter()
            .flat_map(move |links| relations.iter().filter_map(move |rel| links.get(rel)))
            .filter(|link| link.href.is_some())
            .cloned()
            .collect())
    }

    /// Loads every embedded link whose relation is in `rels` (all of them
    /// when `rels` is empty).
    ///
    /// # Errors
    ///
    /// Fails as a whole if any single load fails or returns an error status.
    #[instrument(skip_all, fields(kind = %K::KIND))]
    pub async fn load_embedded_resources(
        &self,
        rels: &[&str],
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Vec<EmbeddedResource>, StateError> {
        let links: Vec<Link> = self
            .embedded_links()?
            .into_iter()
            .filter(|link| rels.is_empty() || rels.contains(&link.rel.as_str()))
            .collect();
        debug!(count = links.len(), "loading embedded resources");

        let loads = links.into_iter().map(|link| async move {
            let uri = link.resolve(self.uri(), &TemplateVars::new())?;
            let mut request = self.request_to(Method::GET, uri, &self.profile().media_type)?;
            apply_all(&mut request, modifiers);
            let response = self.client().send(request.clone()).await?;
            if response.status_class().is_error() {
                return Err(StateError::application(
                    request.method,
                    request.uri.as_str(),
                    response,
                ));
            }
            Ok::<_, StateError>(EmbeddedResource {
                link,
                request,
                response,
            })
        });
        try_join_all(loads).await
    }
}
