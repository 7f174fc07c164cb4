use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::AuthError;

/// Session key holding the serialized access token.
pub const TOKEN_KEY: &str = "oauth2.token";
/// Session key holding the pending CSRF state.
pub const STATE_KEY: &str = "oauth2.state";
/// Session key holding the URL to return to after login.
pub const NEXT_KEY: &str = "oauth2.next";

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access token granted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Token {
    pub fn access(&self) -> &str {
        &self.access_token
    }

    pub fn refresh(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// A token is valid only while `now` is strictly before its expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }
}

/// Named values stored for a single visitor.
///
/// Values are kept as JSON so stores can persist a record without knowing
/// what the middleware puts in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord(HashMap<String, serde_json::Value>);

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `SessionUnavailable` if the stored value does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AuthError> {
        self.0
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    AuthError::SessionUnavailable(format!("undecodable value for {key}: {e}"))
                })
            })
            .transpose()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AuthError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AuthError::SessionUnavailable(format!("cannot encode {key}: {e}")))?;
        self.0.insert(key.to_string(), value);
        Ok(())
    }

    /// Removes `key`, returning whether anything was there.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
