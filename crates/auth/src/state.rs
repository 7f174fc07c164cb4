//! Shared state for the OAuth2 middleware.

use std::sync::Arc;

use oauthgate_core::auth::{ProviderClient, SessionStore};

use crate::config::{OAuth2Config, SessionConfig};
use crate::error::AuthError;
use crate::providers::OAuth2Provider;

/// Read-only state shared by every request: configuration, the provider
/// client and the session store.
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn ProviderClient>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<OAuth2Config>,
    pub session_config: Arc<SessionConfig>,
}

impl AuthState {
    /// Creates the state with an `OAuth2Provider` built from `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid; the middleware
    /// cannot be installed without a valid state.
    pub fn new(
        config: OAuth2Config,
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        let provider = Arc::new(OAuth2Provider::new(&config)?);
        Self::with_provider(config, provider, sessions, session_config)
    }

    /// Creates the state with a caller-supplied provider client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid.
    pub fn with_provider(
        config: OAuth2Config,
        provider: Arc<dyn ProviderClient>,
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        Ok(Self {
            provider,
            sessions,
            config: Arc::new(config),
            session_config: Arc::new(session_config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderEndpoints;
    use crate::sessions::MemorySessionStore;

    #[test]
    fn new_builds_with_valid_config() {
        let config = OAuth2Config::new(
            "client_id",
            "client_secret",
            "http://localhost:3000/oauth2callback",
            ProviderEndpoints::google(),
        )
        .unwrap();

        let state = AuthState::new(
            config,
            Arc::new(MemorySessionStore::default()),
            SessionConfig::default(),
        );
        assert!(state.is_ok());
    }

    #[test]
    fn new_rejects_config_emptied_after_construction() {
        let mut config = OAuth2Config::new(
            "client_id",
            "client_secret",
            "http://localhost:3000/oauth2callback",
            ProviderEndpoints::google(),
        )
        .unwrap();
        config.client_secret.clear();

        let state = AuthState::new(
            config,
            Arc::new(MemorySessionStore::default()),
            SessionConfig::default(),
        );
        assert!(state.is_err());
    }
}
