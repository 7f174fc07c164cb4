//! Mock OAuth2 provider for development and testing.
//!
//! Builds authorization URLs against an arbitrary base and answers code
//! exchanges locally, counting every exchange it performs.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use oauthgate_core::auth::{AuthError, ProviderClient, Result, Token};
use url::Url;

/// Mock provider that issues `access-<code>` tokens, or rejects every code.
pub struct MockProvider {
    authorize_base: Url,
    token_lifetime: Duration,
    fail_exchange: bool,
    exchange_calls: AtomicUsize,
}

impl MockProvider {
    /// Create a provider whose exchanges succeed with one-hour tokens.
    pub fn new(authorize_base: Url) -> Self {
        Self {
            authorize_base,
            token_lifetime: Duration::hours(1),
            fail_exchange: false,
            exchange_calls: AtomicUsize::new(0),
        }
    }

    /// Create a provider whose exchanges always fail.
    pub fn failing(authorize_base: Url) -> Self {
        Self {
            fail_exchange: true,
            ..Self::new(authorize_base)
        }
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Number of code exchanges attempted so far.
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn authorize_url(&self, state: &str) -> Result<Url> {
        let mut url = self.authorize_base.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_exchange {
            return Err(AuthError::Provider("mock provider rejected code".to_string()));
        }

        Ok(Token {
            access_token: format!("access-{code}"),
            refresh_token: None,
            expiry: Utc::now() + self.token_lifetime,
            scopes: Vec::new(),
        })
    }
}
