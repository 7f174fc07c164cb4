//! Authorization-code provider built on the `oauth2` crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth2::{
    basic::BasicClient, reqwest, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use oauthgate_core::auth::{calculate_expiry, AuthError, ProviderClient, Result, Token};
use url::Url;

use crate::config::OAuth2Config;

/// Type alias for a client with the authorize and token endpoints set.
///
/// Type parameters, in order: auth URL, device auth URL, introspection URL,
/// revocation URL, token URL.
type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth2 authorization-code provider.
pub struct OAuth2Provider {
    client: ConfiguredClient,
    http_client: reqwest::Client,
    scopes: Vec<String>,
    fallback_ttl: chrono::Duration,
}

impl OAuth2Provider {
    /// Create a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - An endpoint or the redirect URL is invalid
    /// - The HTTP client cannot be built
    pub fn new(config: &OAuth2Config) -> Result<Self> {
        let auth_url = AuthUrl::new(config.endpoints.auth_url.clone())
            .map_err(|e| AuthError::Configuration(format!("invalid auth URL: {e}")))?;
        let token_url = TokenUrl::new(config.endpoints.token_url.clone())
            .map_err(|e| AuthError::Configuration(format!("invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.to_string())
            .map_err(|e| AuthError::Configuration(format!("invalid redirect URL: {e}")))?;

        // Build HTTP client without redirect following (security requirement)
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        let fallback_ttl = chrono::Duration::from_std(config.fallback_token_ttl)
            .map_err(|e| AuthError::Configuration(format!("invalid fallback token TTL: {e}")))?;

        Ok(Self {
            client,
            http_client,
            scopes: config.scopes.clone(),
            fallback_ttl,
        })
    }
}

#[async_trait]
impl ProviderClient for OAuth2Provider {
    fn authorize_url(&self, state: &str) -> Result<Url> {
        let state_owned = state.to_string();

        let (auth_url, _csrf_token) = self
            .client
            .authorize_url(move || CsrfToken::new(state_owned))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "online")
            .add_extra_param("approval_prompt", "auto")
            .url();

        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::Provider(format!("code exchange failed: {e}")))?;

        token_from_response(&response, Utc::now(), &self.scopes, self.fallback_ttl)
    }
}

/// Converts a token endpoint response into a session token.
///
/// Scopes the provider leaves out are assumed to be the ones requested.
fn token_from_response<R: TokenResponse>(
    response: &R,
    issued_at: DateTime<Utc>,
    requested_scopes: &[String],
    fallback_ttl: chrono::Duration,
) -> Result<Token> {
    let access_token = response.access_token().secret().clone();
    if access_token.is_empty() {
        return Err(AuthError::Provider(
            "token response has an empty access_token".to_string(),
        ));
    }

    let lifetime = match response.expires_in() {
        Some(expires_in) => chrono::Duration::from_std(expires_in)
            .map_err(|e| AuthError::Provider(format!("unusable expires_in: {e}")))?,
        None => fallback_ttl,
    };
    if lifetime <= chrono::Duration::zero() {
        return Err(AuthError::Provider(
            "token response is already expired".to_string(),
        ));
    }

    let scopes = match response.scopes() {
        Some(granted) => granted.iter().map(|s| s.to_string()).collect(),
        None => requested_scopes.to_vec(),
    };

    Ok(Token {
        access_token,
        refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        expiry: calculate_expiry(issued_at, lifetime),
        scopes,
    })
}
