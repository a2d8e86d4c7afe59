//! MySQL-specific database implementations
//!
//! This module contains MySQL implementations of repository traits
//! using SQLx for database operations.

pub mod audit_repository_impl;
pub mod token_repository_impl;

// Re-export the MySQL implementations
pub use audit_repository_impl::MySqlAuditLogRepository;
pub use token_repository_impl::MySqlTokenRepository;
