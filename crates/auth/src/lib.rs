//! OAuth2 authorization-code login for axum applications.
//!
//! This crate provides:
//! - The login, callback and logout flow bound to a per-visitor session
//! - Session loading middleware and session stores (in-memory, Redis via feature flag)
//! - `login_required` middleware and extractors for the request's token

mod config;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod providers;
mod sessions;
mod state;
#[cfg(test)]
mod testing;

pub use config::{FlowPaths, OAuth2Config, ProviderEndpoints, SessionConfig};
pub use error::AuthError;
pub use extractors::{AuthContext, CurrentSession, CurrentToken, OptionalToken};
pub use handlers::{oauth2_routes, with_oauth2};
pub use middleware::{auth_context_middleware, login_required, session_middleware};
#[cfg(feature = "mock")]
pub use providers::MockProvider;
pub use providers::OAuth2Provider;
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
pub use sessions::MemorySessionStore;
pub use state::AuthState;
