//! In-memory session storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use oauthgate_core::auth::{AuthError, Result, SessionId, SessionRecord, SessionStore};

/// In-memory session store for development and testing.
///
/// Records live in a HashMap wrapped in `Arc<RwLock<_>>` and expire after the
/// configured TTL. Every save sweeps expired records, so sessions that are
/// never read again do not pile up. Data is not persisted and is lost when the
/// store is closed or dropped.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
    closed: Arc<AtomicBool>,
    ttl: chrono::Duration,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    record: SessionRecord,
    expires_at: DateTime<Utc>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(7 * 24 * 60 * 60))
    }
}

impl MemorySessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AuthError::SessionUnavailable(
                "session store is closed".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        self.ensure_open()?;

        let now = Utc::now();
        {
            let records = self.records.read().await;
            match records.get(id.as_str()) {
                None => return Ok(None),
                Some(stored) if stored.expires_at > now => {
                    return Ok(Some(stored.record.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired
        self.records.write().await.remove(id.as_str());
        Ok(None)
    }

    async fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        self.ensure_open()?;

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut records = self.records.write().await;
        records.retain(|_, stored| stored.expires_at > now);
        records.insert(
            id.as_str().to_string(),
            StoredRecord {
                record: record.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        self.ensure_open()?;

        let mut records = self.records.write().await;
        records.remove(id.as_str());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.records.write().await.clear();
        tracing::debug!("In-memory session store closed");
        Ok(())
    }
}
