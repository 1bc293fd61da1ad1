//! The client: a middleware pipeline plus a state factory.
//!
//! A [`GedcomxClient`] is cheap to clone and shared by every state reached
//! from it. Entry points ([`read_collection`](GedcomxClient::read_collection),
//! [`read`](GedcomxClient::read)) are the only places a URI is supplied by
//! the caller; everything after that is reached by following links.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tracing::{info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::modifier::RequestModifier;
use crate::state::{
    AnyState, ApplicationState, CollectionResource, CollectionState, DefaultStateFactory,
    ResourceKind, StateError, StateFactory, StateKind, StateProfile,
};
use crate::transport::{
    ExperimentsMiddleware, HttpPipeline, HttpRequest, HttpResponse, LoggingMiddleware,
    ReqwestTransport, ThrottlingMiddleware, Transport,
};
use crate::user_agent;

struct ClientInner {
    pipeline: HttpPipeline,
    factory: Arc<dyn StateFactory>,
}

/// Entry point for navigating a GEDCOM X API.
#[derive(Clone)]
pub struct GedcomxClient {
    inner: Arc<ClientInner>,
}

impl GedcomxClient {
    /// Builds a client over HTTP with the core GEDCOM X factory.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the config is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, StateError> {
        Self::with_factory(config, Arc::new(DefaultStateFactory::gedcomx()))
    }

    /// Builds a client over HTTP with a custom factory.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the config is invalid, the factory does not
    /// map every kind, or the HTTP client cannot be built.
    pub fn with_factory(
        config: &ClientConfig,
        factory: Arc<dyn StateFactory>,
    ) -> Result<Self, StateError> {
        config
            .validate()
            .map_err(|e| StateError::invalid_argument(e.to_string()))?;
        let ua = config
            .user_agent
            .clone()
            .unwrap_or_else(user_agent::default_user_agent);
        let transport = ReqwestTransport::with_settings(
            config.connect_timeout_secs,
            config.read_timeout_secs,
            &ua,
        )?;
        Self::with_transport(config, Arc::new(transport), factory)
    }

    /// Builds a client over any transport.
    ///
    /// Middleware order, outermost first: throttling, experiments (when
    /// feature tags are configured), logging. Each throttled retry therefore
    /// passes through tagging and logging again.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the config is invalid or the factory does
    /// not map every kind.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        factory: Arc<dyn StateFactory>,
    ) -> Result<Self, StateError> {
        config
            .validate()
            .map_err(|e| StateError::invalid_argument(e.to_string()))?;
        factory.validate(&StateKind::ALL)?;

        let mut pipeline = HttpPipeline::new(transport).with(Arc::new(
            ThrottlingMiddleware::new(config.max_throttle_retries)
                .with_max_delay(Duration::from_secs(config.max_retry_after_secs)),
        ));
        if !config.feature_tags.is_empty() {
            pipeline = pipeline.with(Arc::new(ExperimentsMiddleware::new(
                config.feature_tags.iter().map(String::as_str),
            )?));
        }
        pipeline = pipeline.with(Arc::new(LoggingMiddleware::new(config.log_headers)));

        info!(
            factory = factory.name(),
            middleware = pipeline.middleware_count(),
            "gedcomx client ready"
        );
        Ok(Self {
            inner: Arc::new(ClientInner { pipeline, factory }),
        })
    }

    #[must_use]
    pub fn pipeline(&self) -> &HttpPipeline {
        &self.inner.pipeline
    }

    #[must_use]
    pub fn factory(&self) -> &Arc<dyn StateFactory> {
        &self.inner.factory
    }

    pub(crate) fn profile(&self, kind: StateKind) -> Result<StateProfile, StateError> {
        self.inner
            .factory
            .profile(kind)
            .ok_or_else(|| StateError::unknown_state_type(kind.name()))
    }

    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StateError> {
        Ok(self.inner.pipeline.send(request).await?)
    }

    /// Wraps a completed exchange as a typed state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownStateType`] if the factory has no
    /// mapping for `K`.
    pub fn build<K: ResourceKind>(
        &self,
        request: HttpRequest,
        response: HttpResponse,
        access_token: Option<String>,
    ) -> Result<ApplicationState<K>, StateError> {
        let profile = self.profile(K::KIND)?;
        Ok(ApplicationState::from_parts(
            self.clone(),
            profile,
            request,
            response,
            access_token,
        ))
    }

    /// Wraps a completed exchange as the state named `name`, e.g. `"PersonState"`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownStateType`] for an unknown name or an
    /// unmapped kind.
    pub fn build_named(
        &self,
        name: &str,
        request: HttpRequest,
        response: HttpResponse,
        access_token: Option<String>,
    ) -> Result<AnyState, StateError> {
        use crate::state::{
            AgentResource, ChangeHistoryResource, DiscussionResource, PersonChildrenResource,
            PersonMatchResultsResource, PersonMergeResource, PersonNonMatchesResource,
            PersonParentsResource, PersonResource, PersonSearchResultsResource,
            PersonSpousesResource, PlaceResource, RelationshipResource, SourceDescriptionResource,
            UserResource,
        };

        let (req, res, token) = (request, response, access_token);
        let state = match name.parse::<StateKind>()? {
            StateKind::Collection => self.build::<CollectionResource>(req, res, token)?.into(),
            StateKind::Person => self.build::<PersonResource>(req, res, token)?.into(),
            StateKind::PersonParents => self.build::<PersonParentsResource>(req, res, token)?.into(),
            StateKind::PersonChildren => {
                self.build::<PersonChildrenResource>(req, res, token)?.into()
            }
            StateKind::PersonSpouses => self.build::<PersonSpousesResource>(req, res, token)?.into(),
            StateKind::Relationship => self.build::<RelationshipResource>(req, res, token)?.into(),
            StateKind::Discussion => self.build::<DiscussionResource>(req, res, token)?.into(),
            StateKind::Place => self.build::<PlaceResource>(req, res, token)?.into(),
            StateKind::User => self.build::<UserResource>(req, res, token)?.into(),
            StateKind::SourceDescription => {
                self.build::<SourceDescriptionResource>(req, res, token)?.into()
            }
            StateKind::Agent => self.build::<AgentResource>(req, res, token)?.into(),
            StateKind::PersonSearchResults => {
                self.build::<PersonSearchResultsResource>(req, res, token)?.into()
            }
            StateKind::PersonMatchResults => {
                self.build::<PersonMatchResultsResource>(req, res, token)?.into()
            }
            StateKind::PersonNonMatches => {
                self.build::<PersonNonMatchesResource>(req, res, token)?.into()
            }
            StateKind::PersonMerge => self.build::<PersonMergeResource>(req, res, token)?.into(),
            StateKind::ChangeHistory => self.build::<ChangeHistoryResource>(req, res, token)?.into(),
        };
        Ok(state)
    }

    /// Reads a resource at a known URI as a `K` state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] for an invalid URI, transport failure or an
    /// error status.
    #[instrument(skip(self, modifiers), fields(kind = %K::KIND))]
    pub async fn read<K: ResourceKind>(
        &self,
        uri: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<ApplicationState<K>, StateError> {
        let uri = Url::parse(uri)
            .map_err(|e| StateError::invalid_argument(format!("invalid entry URI '{uri}': {e}")))?;
        let profile = self.profile(K::KIND)?;
        // An unauthenticated placeholder state supplies request construction.
        let origin = ApplicationState::<K>::from_parts(
            self.clone(),
            profile.clone(),
            HttpRequest::new(Method::GET, uri.clone()),
            HttpResponse::new(reqwest::StatusCode::OK),
            None,
        );
        let request = origin.request_to(Method::GET, uri, &profile.media_type)?;
        origin.send_as(profile, request, modifiers).await
    }

    /// Reads the collection at the API's entry URI.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] for an invalid URI, transport failure or an
    /// error status.
    pub async fn read_collection(
        &self,
        uri: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<CollectionState, StateError> {
        self.read::<CollectionResource>(uri, modifiers).await
    }
}

impl fmt::Debug for GedcomxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GedcomxClient")
            .field("factory", &self.inner.factory.name())
            .field("pipeline", &self.inner.pipeline)
            .finish()
    }
}
