//! Request-scoped view of a visitor's session record.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use super::{generate_session_id, AuthError, Result, SessionId, SessionRecord};

/// In-memory view of one session, shared between the session middleware and
/// everything downstream of it for the duration of a single request.
///
/// Reads and writes are synchronous. The middleware that loaded the view
/// writes it back to the store once the handler chain returns, and only if
/// something changed.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionInner>>,
}

#[derive(Debug)]
struct SessionInner {
    id: SessionId,
    record: SessionRecord,
    is_new: bool,
    dirty: bool,
    /// Persisted ID this view was moved away from, pending deletion.
    replaced: Option<SessionId>,
}

impl Session {
    /// Wraps a record loaded from the store.
    pub fn loaded(id: SessionId, record: SessionRecord) -> Self {
        Self::with_inner(id, record, false)
    }

    /// Starts a new, empty session with a freshly generated ID.
    pub fn fresh() -> Self {
        Self::with_inner(generate_session_id(), SessionRecord::new(), true)
    }

    fn with_inner(id: SessionId, record: SessionRecord, is_new: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                id,
                record,
                is_new,
                dirty: false,
                replaced: None,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionInner>> {
        self.inner
            .lock()
            .map_err(|_| AuthError::SessionUnavailable("session view poisoned".to_string()))
    }

    pub fn id(&self) -> Result<SessionId> {
        Ok(self.lock()?.id.clone())
    }

    /// Whether the session was created during this request.
    pub fn is_new(&self) -> Result<bool> {
        Ok(self.lock()?.is_new)
    }

    /// Whether the view changed since it was loaded.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(self.lock()?.dirty)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.lock()?.record.get(key)
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut inner = self.lock()?;
        inner.record.insert(key, value)?;
        inner.dirty = true;
        Ok(())
    }

    /// Removes `key`. Removing an absent key is not an error and leaves the
    /// view clean.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.record.remove(key) {
            inner.dirty = true;
        }
        Ok(())
    }

    /// Moves the record to a freshly generated ID, as done on login so an ID
    /// known before authentication stops working. The view counts as new
    /// again so a cookie for the new ID is issued.
    pub fn renew_id(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let old = std::mem::replace(&mut inner.id, generate_session_id());
        if !inner.is_new && inner.replaced.is_none() {
            inner.replaced = Some(old);
        }
        inner.is_new = true;
        inner.dirty = true;
        Ok(())
    }

    /// The stored ID to delete once the view is saved under its new ID.
    pub fn replaced_id(&self) -> Result<Option<SessionId>> {
        Ok(self.lock()?.replaced.clone())
    }

    /// Copy of the current record, for writing back to the store.
    pub fn record(&self) -> Result<SessionRecord> {
        Ok(self.lock()?.record.clone())
    }

    /// Marks the view as persisted.
    pub fn mark_saved(&self) -> Result<()> {
        let mut inner = self.lock()?;
        inner.dirty = false;
        inner.is_new = false;
        inner.replaced = None;
        Ok(())
    }
}
