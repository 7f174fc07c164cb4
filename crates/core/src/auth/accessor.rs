//! Typed access to the OAuth2 fields of a session.

use super::{Result, Session, Token, NEXT_KEY, STATE_KEY, TOKEN_KEY};

/// Narrow facade over a [`Session`] for the token, the pending CSRF state and
/// the next-URL marker. Every `clear_*` is idempotent.
#[derive(Debug, Clone)]
pub struct SessionAccessor {
    session: Session,
}

impl SessionAccessor {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn get_token(&self) -> Result<Option<Token>> {
        self.session.get(TOKEN_KEY)
    }

    pub fn set_token(&self, token: &Token) -> Result<()> {
        self.session.insert(TOKEN_KEY, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.session.remove(TOKEN_KEY)
    }

    pub fn get_state(&self) -> Result<Option<String>> {
        self.session.get(STATE_KEY)
    }

    pub fn set_state(&self, state: &str) -> Result<()> {
        self.session.insert(STATE_KEY, &state)
    }

    pub fn clear_state(&self) -> Result<()> {
        self.session.remove(STATE_KEY)
    }

    pub fn get_next(&self) -> Result<Option<String>> {
        self.session.get(NEXT_KEY)
    }

    pub fn set_next(&self, next: &str) -> Result<()> {
        self.session.insert(NEXT_KEY, &next)
    }

    pub fn clear_next(&self) -> Result<()> {
        self.session.remove(NEXT_KEY)
    }

    /// Moves the session to a new ID. See [`Session::renew_id`].
    pub fn renew_id(&self) -> Result<()> {
        self.session.renew_id()
    }
}

impl From<Session> for SessionAccessor {
    fn from(session: Session) -> Self {
        Self::new(session)
    }
}
