//! Middleware: session loading, the pass-through authentication gate, and
//! `login_required`.

use axum::{
    extract::{OriginalUri, Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use oauthgate_core::auth::{authenticate, Session, SessionId};

use crate::config::SessionConfig;
use crate::error::AuthError;
use crate::extractors::{AuthContext, CurrentSession};
use crate::handlers::found;
use crate::AuthState;

/// Loads the visitor's session before the request and writes it back after.
///
/// Unknown or missing session cookies start a fresh session; its cookie is
/// only issued once something has been stored in it.
pub async fn session_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let cookie_name = state.session_config.cookie_name.as_str();

    let session = match jar.get(cookie_name) {
        Some(cookie) => {
            let id = SessionId::new(cookie.value().to_string());
            match state.sessions.load(&id).await? {
                Some(record) => Session::loaded(id, record),
                None => Session::fresh(),
            }
        }
        None => Session::fresh(),
    };

    req.extensions_mut().insert(session.clone());
    let response = next.run(req).await;

    if !session.is_dirty()? {
        return Ok(response);
    }

    let id = session.id()?;
    let is_new = session.is_new()?;
    let replaced = session.replaced_id()?;
    state.sessions.save(&id, &session.record()?).await?;
    if let Some(old) = replaced {
        state.sessions.destroy(&old).await?;
        tracing::debug!("session id renewed");
    }
    session.mark_saved()?;

    if !is_new {
        return Ok(response);
    }

    let cookie = build_session_cookie(&state.session_config, &id);
    Ok((jar.add(cookie), response).into_response())
}

fn build_session_cookie(config: &SessionConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.ttl_secs()))
        .build()
}

/// Runs the authentication gate for every request and exposes the result to
/// handlers as an [`AuthContext`]. Never redirects.
pub async fn auth_context_middleware(
    CurrentSession(session): CurrentSession,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = authenticate(&session)?;
    tracing::trace!(
        path = %req.uri().path(),
        authenticated = token.is_some(),
        "auth context attached"
    );

    req.extensions_mut().insert(AuthContext::new(session));
    Ok(next.run(req).await)
}

/// Forces unauthenticated visitors through the login flow.
///
/// Redirects to the login path with the current path and query fully
/// percent-encoded in `next`, and halts the chain. Apply it with
/// `axum::middleware::from_fn_with_state(state, login_required)`.
pub async fn login_required(
    State(state): State<AuthState>,
    CurrentSession(session): CurrentSession,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if authenticate(&session)?.is_some() {
        return Ok(next.run(req).await);
    }

    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());
    let target = login_redirect_target(&state.config.paths.login, &uri);

    tracing::debug!(next = %uri, "login required, redirecting");
    Ok(found(&target))
}

fn login_redirect_target(login_path: &str, uri: &Uri) -> String {
    let current = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!("{}?next={}", login_path, urlencoding::encode(current))
}
