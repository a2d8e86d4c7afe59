//! No-op implementation of AuditLogRepository for when audit logging is not needed

use async_trait::async_trait;
use uuid::Uuid;

use super::AuditLogRepository;
use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Discards every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditLogRepository;

impl NoOpAuditLogRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogRepository for NoOpAuditLogRepository {
    async fn create(&self, _audit_log: &AuditLog) -> Result<(), DomainError> {
        Ok(())
    }

    async fn find_by_user(
        &self,
        _user_id: Uuid,
        _limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        Ok(Vec::new())
    }

    async fn find_by_family(
        &self,
        _family_id: Uuid,
        _limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        Ok(Vec::new())
    }
}
