use std::time::Duration;

use oauthgate_core::auth::AuthError as CoreError;
use url::Url;

use crate::error::AuthError;

/// Authorization and token endpoints of an OAuth2 provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub auth_url: String,
    pub token_url: String,
}

impl ProviderEndpoints {
    pub fn google() -> Self {
        Self::custom(
            "https://accounts.google.com/o/oauth2/auth",
            "https://oauth2.googleapis.com/token",
        )
    }

    pub fn github() -> Self {
        Self::custom(
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
        )
    }

    pub fn facebook() -> Self {
        Self::custom(
            "https://www.facebook.com/dialog/oauth",
            "https://graph.facebook.com/oauth/access_token",
        )
    }

    pub fn linkedin() -> Self {
        Self::custom(
            "https://www.linkedin.com/oauth/v2/authorization",
            "https://www.linkedin.com/oauth/v2/accessToken",
        )
    }

    pub fn custom(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }

    /// Looks up a preset by name (`google`, `github`, `facebook`, `linkedin`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "google" => Some(Self::google()),
            "github" => Some(Self::github()),
            "facebook" => Some(Self::facebook()),
            "linkedin" => Some(Self::linkedin()),
            _ => None,
        }
    }
}

/// Paths intercepted by the flow controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPaths {
    pub login: String,
    pub logout: String,
    pub callback: String,
    /// Where visitors land when no next-URL is known.
    pub landing: String,
}

impl Default for FlowPaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            logout: "/logout".to_string(),
            callback: "/oauth2callback".to_string(),
            landing: "/".to_string(),
        }
    }
}

/// OAuth2 client configuration.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: Url,
    /// Requested scopes, joined in this order on the authorize URL.
    pub scopes: Vec<String>,
    pub endpoints: ProviderEndpoints,
    pub paths: FlowPaths,
    /// Lifetime assumed when the provider does not report `expires_in`.
    pub fallback_token_ttl: Duration,
}

impl OAuth2Config {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the client credentials are empty or
    /// the redirect URL is not an absolute http(s) URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: &str,
        endpoints: ProviderEndpoints,
    ) -> Result<Self, AuthError> {
        let config = Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: Url::parse(redirect_url)?,
            scopes: Vec::new(),
            endpoints,
            paths: FlowPaths::default(),
            fallback_token_ttl: Duration::from_secs(60 * 60),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_paths(mut self, paths: FlowPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OAUTH2_CLIENT_ID`: OAuth2 client ID (required)
    /// - `OAUTH2_CLIENT_SECRET`: OAuth2 client secret (required)
    /// - `OAUTH2_REDIRECT_URL`: Absolute callback URL registered with the provider (required)
    /// - `OAUTH2_SCOPES`: Comma-separated scopes, in request order (default: none)
    /// - `OAUTH2_PROVIDER`: `google`, `github`, `facebook` or `linkedin` (default: `google`)
    ///
    /// # Errors
    ///
    /// Missing credentials are an error; there are no placeholder defaults.
    pub fn from_env() -> Result<Self, AuthError> {
        let client_id = required_env("OAUTH2_CLIENT_ID")?;
        let client_secret = required_env("OAUTH2_CLIENT_SECRET")?;
        let redirect_url = required_env("OAUTH2_REDIRECT_URL")?;

        let provider = std::env::var("OAUTH2_PROVIDER").unwrap_or_else(|_| "google".to_string());
        let endpoints = ProviderEndpoints::preset(&provider).ok_or_else(|| {
            CoreError::Configuration(format!("unknown OAUTH2_PROVIDER: {provider}"))
        })?;

        let scopes = std::env::var("OAUTH2_SCOPES")
            .map(|s| parse_scopes(&s))
            .unwrap_or_default();

        Ok(Self::new(client_id, client_secret, &redirect_url, endpoints)?.with_scopes(scopes))
    }

    /// Checks the invariants `new` enforces. Fields are public, so this runs
    /// again when the middleware state is built.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.client_id.trim().is_empty() {
            return Err(CoreError::Configuration("client_id is empty".to_string()).into());
        }
        if self.client_secret.trim().is_empty() {
            return Err(CoreError::Configuration("client_secret is empty".to_string()).into());
        }
        if !matches!(self.redirect_url.scheme(), "http" | "https") {
            return Err(CoreError::Configuration(format!(
                "redirect_url must be http(s): {}",
                self.redirect_url
            ))
            .into());
        }
        for path in [
            &self.paths.login,
            &self.paths.logout,
            &self.paths.callback,
            &self.paths.landing,
        ] {
            if !path.starts_with('/') {
                return Err(
                    CoreError::Configuration(format!("flow path must be absolute: {path}")).into(),
                );
            }
        }
        Ok(())
    }
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "oauthgate_session".to_string(),
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_secure: true,
        }
    }
}

impl SessionConfig {
    /// Session TTL in whole seconds, saturating at `i64::MAX`.
    pub fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Load from environment variables.
    ///
    /// - `SESSION_COOKIE_NAME` (default: `oauthgate_session`)
    /// - `SESSION_TTL_SECS` (default: 7 days)
    /// - `COOKIE_SECURE` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.cookie_secure),
        }
    }
}

fn required_env(key: &str) -> Result<String, AuthError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CoreError::Configuration(format!("{key} is not set")).into()),
    }
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
