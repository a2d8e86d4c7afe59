//! Shared configuration types for the session-guard workspace
//!
//! This crate provides the configuration consumed by every server module:
//! - Environment detection and logging configuration
//! - Database connection settings
//! - Refresh-token lifetime, store timeout and sweep scheduling

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CleanupConfig, ConfigError, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, RefreshTokenConfig, MIN_SECRET_BYTES,
};
