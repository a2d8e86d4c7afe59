//! In-memory AuditLogRepository used by tests and embedded deployments

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AuditLogRepository;
use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainError;

/// Append-only in-memory audit log
pub struct InMemoryAuditLogRepository {
    logs: RwLock<Vec<AuditLog>>,
    fail_writes: AtomicBool,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make `create` fail with a storage error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every stored entry, in insertion order
    pub async fn all(&self) -> Vec<AuditLog> {
        self.logs.read().await.clone()
    }

    fn newest_first<F>(logs: &[AuditLog], limit: usize, filter: F) -> Vec<AuditLog>
    where
        F: Fn(&AuditLog) -> bool,
    {
        let mut matching: Vec<AuditLog> = logs.iter().filter(|log| filter(log)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        matching
    }
}

impl Default for InMemoryAuditLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("in-memory audit log unavailable"));
        }
        self.logs.write().await.push(audit_log.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let logs = self.logs.read().await;
        Ok(Self::newest_first(&logs, limit, |log| log.user_id == Some(user_id)))
    }

    async fn find_by_family(
        &self,
        family_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let logs = self.logs.read().await;
        Ok(Self::newest_first(&logs, limit, |log| log.family_id == Some(family_id)))
    }
}
