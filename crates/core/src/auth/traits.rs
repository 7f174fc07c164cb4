use async_trait::async_trait;
use url::Url;

use super::{AuthError, SessionId, SessionRecord, Token};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over the OAuth2 identity provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Build the authorization URL the visitor is redirected to.
    fn authorize_url(&self, state: &str) -> Result<Url>;

    /// Exchange an authorization code for a token.
    async fn exchange_code(&self, code: &str) -> Result<Token>;
}

/// Session storage abstraction.
///
/// Stores persist whole records; reading and writing individual named values
/// happens on the request's [`Session`](super::Session) view.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the record for a session, if any.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>>;

    /// Persist the record for a session, replacing what was there.
    async fn save(&self, id: &SessionId, record: &SessionRecord) -> Result<()>;

    /// Remove a session entirely.
    async fn destroy(&self, id: &SessionId) -> Result<()>;

    /// Release the store's resources. Called once on shutdown.
    async fn close(&self) -> Result<()>;
}
