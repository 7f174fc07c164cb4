use chrono::{DateTime, Utc};

use super::{is_token_expired, Result, SessionAccessor, Token};

/// Returns the session's token if it is still live.
///
/// An expired token is removed from the session before returning `None`, so
/// an expired login looks exactly like no login at all.
pub fn authenticate(session: &SessionAccessor) -> Result<Option<Token>> {
    authenticate_at(session, Utc::now())
}

/// [`authenticate`] against an explicit clock.
pub fn authenticate_at(session: &SessionAccessor, now: DateTime<Utc>) -> Result<Option<Token>> {
    let Some(token) = session.get_token()? else {
        return Ok(None);
    };

    if is_token_expired(&token, now) {
        tracing::debug!(expiry = %token.expiry, "access token expired, logging out");
        session.clear_token()?;
        return Ok(None);
    }

    Ok(Some(token))
}
