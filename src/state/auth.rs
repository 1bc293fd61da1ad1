//! OAuth2 token acquisition against the advertised token endpoint.
//!
//! Only request construction and token extraction live here; obtaining
//! credentials (browser redirects, secret storage) belongs to the caller.

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;
use url::form_urlencoded;

use super::{ApplicationState, ResourceKind, StateError};
use crate::link::{TemplateVars, rel};
use crate::model::{FORM_URLENCODED, JSON};
use crate::transport::HttpRequest;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl<K: ResourceKind> ApplicationState<K> {
    /// Resource-owner password grant.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Authentication`] when no token endpoint is
    /// advertised or the response has no token, and [`StateError::Application`]
    /// when the endpoint answers with an error status.
    pub async fn authenticate_via_oauth2_password(
        &self,
        username: &str,
        password: &str,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Self, StateError> {
        let mut form = vec![
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("client_id", client_id),
        ];
        if let Some(secret) = client_secret {
            form.push(("client_secret", secret));
        }
        self.authenticate_via_oauth2(&form).await
    }

    /// Authorization-code grant, after the user returned from
    /// [`oauth2_authorization_uri`](Self::oauth2_authorization_uri).
    ///
    /// # Errors
    ///
    /// As [`authenticate_via_oauth2_password`](Self::authenticate_via_oauth2_password).
    pub async fn authenticate_via_oauth2_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Self, StateError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
        ];
        if let Some(secret) = client_secret {
            form.push(("client_secret", secret));
        }
        self.authenticate_via_oauth2(&form).await
    }

    /// Client-credentials grant.
    ///
    /// # Errors
    ///
    /// As [`authenticate_via_oauth2_password`](Self::authenticate_via_oauth2_password).
    pub async fn authenticate_via_oauth2_client_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, StateError> {
        self.authenticate_via_oauth2(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .await
    }

    /// Unauthenticated session for read-only public access.
    ///
    /// # Errors
    ///
    /// As [`authenticate_via_oauth2_password`](Self::authenticate_via_oauth2_password).
    pub async fn unauthenticated_access(
        &self,
        ip_address: &str,
        client_id: &str,
    ) -> Result<Self, StateError> {
        self.authenticate_via_oauth2(&[
            ("grant_type", "unauthenticated_session"),
            ("ip_address", ip_address),
            ("client_id", client_id),
        ])
        .await
    }

    /// Posts a token request and returns this state carrying the new token.
    ///
    /// # Errors
    ///
    /// As [`authenticate_via_oauth2_password`](Self::authenticate_via_oauth2_password).
    #[instrument(skip_all, fields(kind = %K::KIND))]
    pub async fn authenticate_via_oauth2(&self, form: &[(&str, &str)]) -> Result<Self, StateError> {
        let Some(link) = self.link(rel::OAUTH2_TOKEN)? else {
            return Err(StateError::authentication(format!(
                "no OAuth2 token endpoint advertised by {}",
                self.uri()
            )));
        };
        let uri = link.resolve(self.uri(), &TemplateVars::new())?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish()
            .into_bytes();
        let request = HttpRequest::new(Method::POST, uri)
            .with_header(ACCEPT, HeaderValue::from_static(JSON))
            .with_body(HeaderValue::from_static(FORM_URLENCODED), body);

        let response = self.client().send(request.clone()).await?;
        if response.status_class().is_error() {
            warn!(status = response.status.as_u16(), "token request rejected");
            return Err(StateError::application(
                request.method,
                request.uri.as_str(),
                response,
            ));
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| StateError::authentication(format!("unreadable token response: {e}")))?;
        match token.access_token {
            Some(access_token) if !access_token.is_empty() => {
                info!("obtained OAuth2 access token");
                self.authenticate_with_access_token(&access_token)
            }
            _ => Err(StateError::authentication(
                token
                    .error_description
                    .or(token.error)
                    .unwrap_or_else(|| "token response carried no access_token".to_string()),
            )),
        }
    }

    /// The authorization-endpoint URI to send a user to for the code grant.
    ///
    /// `Ok(None)` when no authorization endpoint is advertised.
    ///
    /// # Errors
    ///
    /// Propagates entity and link-resolution errors.
    pub fn oauth2_authorization_uri(
        &self,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<Option<Url>, StateError> {
        let Some(link) = self.link(rel::OAUTH2_AUTHORIZE)? else {
            return Ok(None);
        };
        let mut uri = link.resolve(self.uri(), &TemplateVars::new())?;
        uri.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri);
        Ok(Some(uri))
    }
}
