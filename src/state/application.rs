//! The application state engine.
//!
//! An [`ApplicationState`] is an immutable snapshot of one completed HTTP
//! exchange plus the access token in effect. Every operation that talks to
//! the server returns a *new* state; nothing here mutates `self`.
//!
//! # Transitions
//!
//! Relation-following transitions return `Result<Option<S>, StateError>`:
//!
//! - `Ok(None)`: the relation is absent; no request was sent
//! - `Ok(Some(state))`: the exchange completed, including 304, 410 and 412
//! - `Err(StateError::Application { .. })`: any other 4xx/5xx, including a
//!   429 that outlasted the retry budget

use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};
use url::Url;

use super::{ResourceKind, StateError, StateKind, StateProfile};
use crate::GedcomxClient;
use crate::link::{Link, TemplateVars, parse_link_header, rel};
use crate::model::Linked;
use crate::modifier::{CacheDirectives, Preconditions, RequestModifier, apply_all};
use crate::transport::{HttpRequest, HttpResponse, StatusClass};

/// One position in the resource graph.
pub struct ApplicationState<K: ResourceKind> {
    client: GedcomxClient,
    profile: StateProfile,
    request: HttpRequest,
    response: HttpResponse,
    access_token: Option<String>,
    entity: OnceLock<Result<Option<K::Entity>, String>>,
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ApplicationState<K> {
    pub(crate) fn from_parts(
        client: GedcomxClient,
        profile: StateProfile,
        request: HttpRequest,
        response: HttpResponse,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            profile,
            request,
            response,
            access_token,
            entity: OnceLock::new(),
            kind: PhantomData,
        }
    }

    /// A state of the same kind and profile for a fresh exchange.
    ///
    /// The access token carries over; the entity cache starts empty.
    #[must_use]
    pub fn reconstruct(&self, request: HttpRequest, response: HttpResponse) -> Self {
        Self::from_parts(
            self.client.clone(),
            self.profile.clone(),
            request,
            response,
            self.access_token.clone(),
        )
    }

    // ==================== Accessors ====================

    #[must_use]
    pub fn kind(&self) -> StateKind {
        K::KIND
    }

    #[must_use]
    pub fn profile(&self) -> &StateProfile {
        &self.profile
    }

    #[must_use]
    pub fn client(&self) -> &GedcomxClient {
        &self.client
    }

    #[must_use]
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// The request URI of this exchange.
    #[must_use]
    pub fn uri(&self) -> &Url {
        &self.request.uri
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    #[must_use]
    pub fn status_class(&self) -> StatusClass {
        self.response.status_class()
    }

    /// Whether the response is a non-advisory 4xx/5xx.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status_class().is_error()
    }

    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.response.etag()
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.response.last_modified()
    }

    /// `If-Match` / `If-Unmodified-Since` from this state's validators.
    #[must_use]
    pub fn preconditions(&self) -> Preconditions {
        Preconditions::from_response(&self.response)
    }

    /// `If-None-Match` / `If-Modified-Since` from this state's validators.
    #[must_use]
    pub fn cache_directives(&self) -> CacheDirectives {
        CacheDirectives::from_response(&self.response)
    }

    /// Returns `self` unless the response is an error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Application`] carrying the response.
    pub fn if_successful(self) -> Result<Self, StateError> {
        if self.is_error() {
            warn!(
                kind = %K::KIND,
                status = self.response.status.as_u16(),
                uri = %self.request.uri,
                class = self.status_class().as_str(),
                "exchange failed"
            );
            return Err(StateError::application(
                self.request.method,
                self.request.uri.as_str(),
                self.response,
            ));
        }
        Ok(self)
    }

    // ==================== Entity ====================

    /// The parsed entity, loaded on first access.
    ///
    /// `Ok(None)` when the entity policy rejects this (method, status) pair
    /// or the body is empty. The parse runs at most once per state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::EntityParse`] if the body is not a valid entity;
    /// the failure is cached and reported again on later calls.
    pub fn entity(&self) -> Result<Option<&K::Entity>, StateError> {
        match self.entity.get_or_init(|| self.load_entity()) {
            Ok(entity) => Ok(entity.as_ref()),
            Err(reason) => Err(StateError::entity_parse(self.request.uri.as_str(), reason.clone())),
        }
    }

    fn load_entity(&self) -> Result<Option<K::Entity>, String> {
        if !self
            .profile
            .entity_policy
            .should_parse(&self.request.method, self.response.status)
        {
            trace!(
                kind = %K::KIND,
                method = %self.request.method,
                status = self.response.status.as_u16(),
                "entity policy skips parse"
            );
            return Ok(None);
        }
        if !self.response.has_body() {
            return Ok(None);
        }
        serde_json::from_slice(&self.response.body)
            .map(Some)
            .map_err(|e| e.to_string())
    }

    /// The part of the entity that represents this resource.
    ///
    /// # Errors
    ///
    /// Propagates [`StateError::EntityParse`].
    pub fn scope(&self) -> Result<Option<&K::Scope>, StateError> {
        Ok(self.entity()?.and_then(K::scope))
    }

    // ==================== Links ====================

    /// Finds a link by relation: scope links first, then entity links,
    /// then `Link` response headers.
    ///
    /// # Errors
    ///
    /// Propagates [`StateError::EntityParse`].
    pub fn link(&self, rel: &str) -> Result<Option<Link>, StateError> {
        if let Some(entity) = self.entity()? {
            let from_body = K::scope_links(entity)
                .and_then(|links| links.get(rel))
                .or_else(|| entity.links().get(rel));
            if let Some(link) = from_body {
                return Ok(Some(link.clone()));
            }
        }
        Ok(self
            .response
            .link_headers()
            .into_iter()
            .flat_map(parse_link_header)
            .find(|link| link.rel == rel))
    }

    /// # Errors
    ///
    /// Propagates [`StateError::EntityParse`].
    pub fn has_link(&self, rel: &str) -> Result<bool, StateError> {
        Ok(self.link(rel)?.is_some())
    }

    /// The canonical URI of this resource: its `self` link, else the
    /// `Location` of a create response, else the request URI.
    ///
    /// # Errors
    ///
    /// Propagates entity and link-resolution errors.
    pub fn self_uri(&self) -> Result<Url, StateError> {
        if let Some(link) = self.link(rel::SELF)?
            && link.href.is_some()
        {
            return Ok(link.resolve(&self.request.uri, &TemplateVars::new())?);
        }
        if let Some(location) = self.response.location()
            && let Ok(uri) = self.request.uri.join(location)
        {
            return Ok(uri);
        }
        Ok(self.request.uri.clone())
    }

    // ==================== Transitions ====================

    /// Builds a request carrying this state's credentials.
    pub(crate) fn request_to(
        &self,
        method: Method,
        uri: Url,
        media_type: &str,
    ) -> Result<HttpRequest, StateError> {
        let accept = HeaderValue::from_str(media_type).map_err(|_| {
            StateError::invalid_argument(format!("invalid media type '{media_type}'"))
        })?;
        let mut request = HttpRequest::new(method, uri).with_header(ACCEPT, accept);
        if let Some(token) = &self.access_token {
            request = request.with_header(AUTHORIZATION, bearer(token)?);
        }
        Ok(request)
    }

    /// Sends `request` and wraps the exchange as a `T` state.
    pub(crate) async fn send_as<T: ResourceKind>(
        &self,
        profile: StateProfile,
        mut request: HttpRequest,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<ApplicationState<T>, StateError> {
        apply_all(&mut request, modifiers);
        let response = self.client.send(request.clone()).await?;
        ApplicationState::<T>::from_parts(
            self.client.clone(),
            profile,
            request,
            response,
            self.access_token.clone(),
        )
        .if_successful()
    }

    /// Sends one request to `uri` and wraps the result as a `T` state.
    pub(crate) async fn exchange<T: ResourceKind>(
        &self,
        method: Method,
        uri: Url,
        body: Option<Vec<u8>>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<ApplicationState<T>, StateError> {
        let profile = self.client.profile(T::KIND)?;
        self.exchange_with(profile, method, uri, body, modifiers).await
    }

    async fn exchange_with<T: ResourceKind>(
        &self,
        profile: StateProfile,
        method: Method,
        uri: Url,
        body: Option<Vec<u8>>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<ApplicationState<T>, StateError> {
        let mut request = self.request_to(method, uri, &profile.media_type)?;
        if let Some(body) = body {
            let content_type = HeaderValue::from_str(&profile.media_type).map_err(|_| {
                StateError::invalid_argument(format!("invalid media type '{}'", profile.media_type))
            })?;
            request = request.with_body(content_type, body);
        }
        self.send_as(profile, request, modifiers).await
    }

    /// Follows the link named `rel` to a `T` state.
    ///
    /// Returns `Ok(None)` without any I/O when the relation is absent.
    #[instrument(skip_all, fields(from = %K::KIND, to = %T::KIND, rel = rel, method = %method))]
    pub(crate) async fn follow<T: ResourceKind>(
        &self,
        method: Method,
        rel: &str,
        vars: &TemplateVars,
        body: Option<Vec<u8>>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<ApplicationState<T>>, StateError> {
        let Some(link) = self.link(rel)? else {
            debug!("relation absent; no transition");
            return Ok(None);
        };
        self.follow_link(&link, method, vars, body, modifiers).await
    }

    /// Follows an already-resolved link, e.g. one taken from a feed entry.
    pub(crate) async fn follow_link<T: ResourceKind>(
        &self,
        link: &Link,
        method: Method,
        vars: &TemplateVars,
        body: Option<Vec<u8>>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<ApplicationState<T>>, StateError> {
        let uri = link.resolve(&self.request.uri, vars)?;
        self.exchange::<T>(method, uri, body, modifiers).await.map(Some)
    }

    async fn on_self(
        &self,
        method: Method,
        body: Option<Vec<u8>>,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Self, StateError> {
        let uri = self.self_uri()?;
        self.exchange_with(self.profile.clone(), method, uri, body, modifiers)
            .await
    }

    /// Re-reads this resource.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn get(&self, modifiers: &[&dyn RequestModifier]) -> Result<Self, StateError> {
        self.on_self(Method::GET, None, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn head(&self, modifiers: &[&dyn RequestModifier]) -> Result<Self, StateError> {
        self.on_self(Method::HEAD, None, modifiers).await
    }

    /// Asks which methods the resource allows.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn options(&self, modifiers: &[&dyn RequestModifier]) -> Result<Self, StateError> {
        self.on_self(Method::OPTIONS, None, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn delete(&self, modifiers: &[&dyn RequestModifier]) -> Result<Self, StateError> {
        self.on_self(Method::DELETE, None, modifiers).await
    }

    /// Replaces the resource with `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn put(
        &self,
        entity: &K::Entity,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Self, StateError> {
        let body = to_body(entity)?;
        self.on_self(Method::PUT, Some(body), modifiers).await
    }

    /// Posts `entity` to the resource.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] on serialization or transport failure or an error status.
    pub async fn post(
        &self,
        entity: &K::Entity,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Self, StateError> {
        let body = to_body(entity)?;
        self.on_self(Method::POST, Some(body), modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_first_page(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<Self>, StateError> {
        self.read_page(rel::FIRST, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_next_page(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<Self>, StateError> {
        self.read_page(rel::NEXT, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_previous_page(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<Self>, StateError> {
        self.read_page(rel::PREVIOUS, modifiers).await
    }

    /// # Errors
    ///
    /// Returns [`StateError`] on transport failure or an error status.
    pub async fn read_last_page(
        &self,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<Self>, StateError> {
        self.read_page(rel::LAST, modifiers).await
    }

    async fn read_page(
        &self,
        page_rel: &str,
        modifiers: &[&dyn RequestModifier],
    ) -> Result<Option<Self>, StateError> {
        let Some(link) = self.link(page_rel)? else {
            debug!(kind = %K::KIND, rel = page_rel, "no such page");
            return Ok(None);
        };
        let uri = link.resolve(&self.request.uri, &TemplateVars::new())?;
        self.exchange_with(self.profile.clone(), Method::GET, uri, None, modifiers)
            .await
            .map(Some)
    }

    /// The same exchange, with `token` used for every later transition.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidArgument`] if the token is empty or is
    /// not valid header text.
    pub fn authenticate_with_access_token(&self, token: &str) -> Result<Self, StateError> {
        if token.trim().is_empty() {
            return Err(StateError::invalid_argument("access token must not be empty"));
        }
        bearer(token)?;
        Ok(Self::from_parts(
            self.client.clone(),
            self.profile.clone(),
            self.request.clone(),
            self.response.clone(),
            Some(token.to_string()),
        ))
    }
}

fn bearer(token: &str) -> Result<HeaderValue, StateError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| StateError::invalid_argument("access token is not valid header text"))?;
    value.set_sensitive(true);
    Ok(value)
}

pub(crate) fn to_body<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>, StateError> {
    Ok(serde_json::to_vec(payload)?)
}

impl<K: ResourceKind> fmt::Debug for ApplicationState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationState")
            .field("kind", &K::KIND)
            .field("variant", &self.profile.variant)
            .field("method", &self.request.method)
            .field("uri", &self.request.uri.as_str())
            .field("status", &self.response.status.as_u16())
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}
