//! Audit log repository trait defining the interface for audit log persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Repository trait for AuditLog entity persistence operations
///
/// Audit writes sit on the rotation path, so implementations should keep
/// `create` cheap. Callers never fail a token operation because of an audit
/// write error.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Create a new audit log entry
    ///
    /// # Returns
    /// * `Ok(())` on successful creation
    /// * `Err(DomainError)` if the operation fails
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError>;

    /// Find audit logs by user ID, newest first
    ///
    /// # Arguments
    /// * `user_id` - The user ID to search for
    /// * `limit` - Maximum number of records to return
    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError>;

    /// Find audit logs by token family, newest first
    async fn find_by_family(
        &self,
        family_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError>;
}
