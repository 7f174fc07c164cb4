//! Demo page handlers.

use oauthgate_auth::{AuthContext, AuthError, CurrentToken};

/// Handler for GET /
///
/// Open to everyone; reports whether the visitor holds a live token.
pub async fn index(ctx: AuthContext) -> Result<&'static str, AuthError> {
    Ok(if ctx.is_authenticated()? {
        "logged in"
    } else {
        "not logged in, or the access token is expired"
    })
}

/// Handler for GET /restrict
///
/// Mounted behind `login_required`, so the token is always present here.
pub async fn restrict(CurrentToken(token): CurrentToken) -> String {
    format!("OK: {}", token.access())
}
