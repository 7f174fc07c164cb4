//! HTTP handlers for the OAuth2 flow paths.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use oauthgate_core::auth::{
    authenticate, generate_state, next_from_referer, validate_next, AuthError as CoreError,
    SessionAccessor,
};
use serde::Deserialize;

use crate::error::AuthError;
use crate::extractors::CurrentSession;
use crate::middleware::{auth_context_middleware, session_middleware};
use crate::AuthState;

/// Query parameters for OAuth2 callback.
#[derive(Deserialize, Default)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the visitor denied consent.
    pub error: Option<String>,
}

/// Query parameters for the login and logout endpoints.
#[derive(Deserialize, Default)]
pub struct NextQuery {
    /// URL to redirect to afterwards.
    pub next: Option<String>,
}

/// Creates the router for the flow paths configured in `state`.
///
/// Routes (default paths):
/// - `GET /login` - Start the authorization code flow
/// - `GET /oauth2callback` - Handle the provider's redirect back
/// - `GET /logout` - Forget the visitor's token
pub fn oauth2_routes(state: &AuthState) -> Router<AuthState> {
    let paths = &state.config.paths;
    Router::new()
        .route(&paths.login, get(login))
        .route(&paths.callback, get(callback))
        .route(&paths.logout, get(logout))
}

/// Installs the OAuth2 flow on `router`.
///
/// Adds the flow routes, attaches an `AuthContext` to every request, and
/// loads and writes back the visitor's session around the whole chain.
pub fn with_oauth2<S>(router: Router<S>, state: AuthState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .merge(oauth2_routes(&state).with_state(state.clone()))
        .layer(middleware::from_fn(auth_context_middleware))
        .layer(middleware::from_fn_with_state(state, session_middleware))
}

/// `302 Found` to `location`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

async fn login(
    State(state): State<AuthState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NextQuery>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let next = query
        .next
        .as_deref()
        .and_then(validate_next)
        .map(String::from)
        .or_else(|| {
            headers
                .get(header::REFERER)
                .and_then(|v| v.to_str().ok())
                .and_then(next_from_referer)
        })
        .unwrap_or_else(|| state.config.paths.landing.clone());

    // Already logged in: skip the provider round-trip
    if authenticate(&session)?.is_some() {
        return Ok(found(&next));
    }

    let csrf_state = generate_state();
    session.set_state(&csrf_state)?;
    session.set_next(&next)?;

    let auth_url = state.provider.authorize_url(&csrf_state)?;
    tracing::debug!(next = %next, "redirecting to provider");

    Ok(found(auth_url.as_str()))
}

async fn callback(
    State(state): State<AuthState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AuthError> {
    // The pending state is single-use whether or not it matches
    let expected = session.get_state()?;
    session.clear_state()?;

    if !state_matches(query.state.as_deref(), expected.as_deref()) {
        return Err(CoreError::StateMismatch.into());
    }

    if let Some(error) = query.error {
        return Err(CoreError::Provider(format!("authorization denied: {error}")).into());
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(CoreError::MissingCode)?;

    let token = state.provider.exchange_code(&code).await?;
    session.set_token(&token)?;
    session.renew_id()?;

    let next = take_next(&session, &state.config.paths.landing)?;
    tracing::debug!(next = %next, "login complete");

    Ok(found(&next))
}

async fn logout(
    State(state): State<AuthState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<NextQuery>,
) -> Result<Response, AuthError> {
    session.clear_token()?;

    let next = query
        .next
        .as_deref()
        .and_then(validate_next)
        .unwrap_or(state.config.paths.landing.as_str());

    Ok(found(next))
}

fn state_matches(received: Option<&str>, expected: Option<&str>) -> bool {
    match (received, expected) {
        (Some(received), Some(expected)) => !expected.is_empty() && received == expected,
        _ => false,
    }
}

/// Consumes the stored next-URL, falling back to `landing`.
fn take_next(session: &SessionAccessor, landing: &str) -> Result<String, AuthError> {
    let next = session
        .get_next()?
        .as_deref()
        .and_then(validate_next)
        .map(String::from)
        .unwrap_or_else(|| landing.to_string());
    session.clear_next()?;
    Ok(next)
}
