//! Refresh token services
//!
//! This module handles the refresh token lifecycle:
//! - Issuing a new token family at login
//! - Rotating tokens and detecting replay of rotated tokens
//! - Revoking single tokens, whole families or every token of a user
//! - Background sweeping of expired tokens

mod cleanup;
mod config;
mod context;
mod issuer;
mod reuse_detector;
mod revocation;
mod rotator;
mod secret;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::TokenServiceConfig;
pub use context::TokenContext;
pub use issuer::{IssuedToken, TokenIssuer};
pub use reuse_detector::ReuseDetector;
pub use revocation::RevocationService;
pub use rotator::TokenRotator;
pub use secret::{hash_secret, OsSecretGenerator, RefreshSecret, SecretGenerator};
pub use service::RefreshTokenService;
