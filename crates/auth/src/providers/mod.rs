//! OAuth2 provider implementations.
//!
//! This module contains implementations of `ProviderClient` for:
//! - Any authorization-code provider reachable through `ProviderEndpoints`
//! - A mock provider for tests and local development (with `mock` feature)

mod basic;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use basic::OAuth2Provider;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockProvider;
