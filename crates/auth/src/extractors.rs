//! Axum extractors for the session and the authentication context.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use oauthgate_core::auth::{
    authenticate, AuthError as CoreError, Session, SessionAccessor, Token,
};

use crate::error::AuthError;

/// Typed accessor over the session loaded by the session middleware.
///
/// Fails with `SessionUnavailable` when the session middleware is not
/// installed in front of the handler.
pub struct CurrentSession(pub SessionAccessor);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_from_parts(parts).map(|session| CurrentSession(session.into()))
    }
}

pub(crate) fn session_from_parts(parts: &Parts) -> Result<Session, AuthError> {
    parts.extensions.get::<Session>().cloned().ok_or_else(|| {
        CoreError::SessionUnavailable("session middleware is not installed".to_string()).into()
    })
}

/// Request-scoped authentication context.
///
/// Inserted by the flow controller for every request it passes through.
#[derive(Debug, Clone)]
pub struct AuthContext {
    session: SessionAccessor,
}

impl AuthContext {
    pub fn new(session: SessionAccessor) -> Self {
        Self { session }
    }

    /// The visitor's live token, if any. Expired tokens are purged and never
    /// returned.
    pub fn get_token(&self) -> Result<Option<Token>, AuthError> {
        Ok(authenticate(&self.session)?)
    }

    /// Stores a token obtained outside the standard flow, writing through to
    /// the session.
    pub fn set_token(&self, token: &Token) -> Result<(), AuthError> {
        Ok(self.session.set_token(token)?)
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.get_token()?.is_some())
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(ctx.clone());
        }
        session_from_parts(parts).map(|session| AuthContext::new(SessionAccessor::from(session)))
    }
}

/// Extractor for a live token. Returns 401 if the visitor is not logged in.
pub struct CurrentToken(pub Token);

impl<S> FromRequestParts<S> for CurrentToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = AuthContext::from_request_parts(parts, state)
            .await
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable"))?;

        let token = ctx
            .get_token()
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable"))?
            .ok_or((StatusCode::UNAUTHORIZED, "Not logged in"))?;

        Ok(CurrentToken(token))
    }
}

/// Extractor for an optional token. Returns None if not logged in.
pub struct OptionalToken(pub Option<Token>);

impl<S> FromRequestParts<S> for OptionalToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = AuthContext::from_request_parts(parts, state).await?;
        Ok(OptionalToken(ctx.get_token()?))
    }
}
