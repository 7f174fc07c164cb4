use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the oauthgate_auth crate.
///
/// This wraps the core `AuthError` and adds the failures that only happen at
/// the I/O edge.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state checks, provider, session view)
    #[error(transparent)]
    Core(#[from] oauthgate_core::auth::AuthError),

    /// A configured URL failed to parse
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use oauthgate_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::StateMismatch | CoreError::MissingCode => {
                    tracing::warn!("Rejected OAuth2 callback: {}", self);
                    (StatusCode::BAD_REQUEST, self.to_string())
                }
                CoreError::Provider(_) => {
                    tracing::error!("Provider error: {}", self);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Authentication provider error".to_string(),
                    )
                }
                CoreError::SessionUnavailable(_) => {
                    tracing::error!("Session error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
                CoreError::Configuration(_) => {
                    tracing::error!("Config error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server configuration error".to_string(),
                    )
                }
            },
            AuthError::InvalidUrl(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
