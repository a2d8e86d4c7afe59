//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the session-guard
//! token engine. It provides the concrete MySQL implementations of the
//! token store and audit log, connection pool management, and logging setup
//! for the binaries.
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use session_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber setup
pub mod logging;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<session_shared::ConfigError> for InfrastructureError {
    fn from(err: session_shared::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}
