use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("OAuth2 state parameter missing or mismatched")]
    StateMismatch,

    #[error("authorization code missing from callback")]
    MissingCode,

    #[error("provider error: {0}")]
    Provider(String),

    #[error("session unavailable: {0}")]
    SessionUnavailable(String),
}
