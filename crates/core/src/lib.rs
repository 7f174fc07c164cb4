//! Core types and functions for oauthgate.
//!
//! Everything in here is free of HTTP framework concerns: the token model,
//! the session view and its typed accessor, the authentication gate and the
//! traits the I/O layer implements.

pub mod auth;
