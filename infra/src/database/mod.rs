//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Table creation for the token store and audit log
//! - Repository implementations with transactional rotation

pub mod connection;
pub mod mysql;
pub mod schema;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlAuditLogRepository, MySqlTokenRepository};
pub use schema::ensure_schema;
