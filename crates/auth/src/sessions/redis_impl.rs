//! Redis session storage implementation.

use async_trait::async_trait;
use fred::prelude::*;
use oauthgate_core::auth::{AuthError, Result, SessionId, SessionRecord, SessionStore};
use std::time::Duration;

/// Redis-backed session storage.
///
/// Each record is a JSON string under `session:<id>` with an `EX` TTL that is
/// refreshed on every save.
pub struct RedisSessionStore {
    pool: Pool,
    session_ttl: Duration,
}

impl RedisSessionStore {
    /// Creates a new Redis session store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connected Redis connection pool
    /// * `session_ttl` - TTL for session data
    pub fn new(pool: Pool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    fn session_key(id: &SessionId) -> String {
        format!("session:{}", id)
    }
}

fn storage_error(e: impl std::fmt::Display) -> AuthError {
    AuthError::SessionUnavailable(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let key = Self::session_key(id);
        let value: Option<String> = self.pool.get(&key).await.map_err(storage_error)?;

        match value {
            Some(json) => {
                let record: SessionRecord = serde_json::from_str(&json).map_err(storage_error)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        let key = Self::session_key(id);
        let value = serde_json::to_string(record).map_err(storage_error)?;

        let ttl_secs = i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX);

        self.pool
            .set::<(), _, _>(&key, &value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let key = Self::session_key(id);
        self.pool.del::<(), _>(&key).await.map_err(storage_error)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pool.quit().await.map_err(storage_error)?;
        tracing::debug!("Redis session store closed");
        Ok(())
    }
}
