use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{SessionId, Token};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    SessionId::new(random_alphanumeric(32))
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Check if a token has expired.
pub fn is_token_expired(token: &Token, now: DateTime<Utc>) -> bool {
    !token.is_valid_at(now)
}

/// Calculate token expiry from the issue time and the provider-reported lifetime.
pub fn calculate_expiry(issued_at: DateTime<Utc>, lifetime: Duration) -> DateTime<Utc> {
    issued_at + lifetime
}
