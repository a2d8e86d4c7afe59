//! Audit service for recording refresh-token security events.
//!
//! Writes never fail the operation being audited. A failed write is logged
//! with `tracing::warn!` and dropped.

use std::sync::Arc;
use tokio::task;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::audit::AuditLog;
use crate::errors::DomainResult;
use crate::repositories::{AuditLogRepository, NoOpAuditLogRepository};

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Whether to run audit writes in a background task
    pub async_writes: bool,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self { async_writes: true }
    }
}

/// Service for recording and reading the token audit trail
pub struct AuditService {
    repository: Arc<dyn AuditLogRepository>,
    config: AuditServiceConfig,
}

impl AuditService {
    /// Create a new audit service
    pub fn new(repository: Arc<dyn AuditLogRepository>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Audit service that discards every entry
    pub fn disabled() -> Self {
        Self::new(
            Arc::new(NoOpAuditLogRepository),
            AuditServiceConfig { async_writes: false },
        )
    }

    /// Record an audit entry
    pub async fn record(&self, audit_log: AuditLog) {
        if audit_log.event_type.is_security_alert() {
            warn!(
                event = audit_log.event_type.as_str(),
                user_id = ?audit_log.user_id,
                family_id = ?audit_log.family_id,
                "Recording security audit event"
            );
        }
        self.write_log(audit_log).await;
    }

    /// Recent audit entries for a user, newest first
    pub async fn user_events(&self, user_id: Uuid, limit: usize) -> DomainResult<Vec<AuditLog>> {
        self.repository.find_by_user(user_id, limit).await
    }

    /// Recent audit entries for a token family, newest first
    pub async fn family_events(
        &self,
        family_id: Uuid,
        limit: usize,
    ) -> DomainResult<Vec<AuditLog>> {
        self.repository.find_by_family(family_id, limit).await
    }

    async fn write_log(&self, audit_log: AuditLog) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.create(&audit_log).await {
                    warn!(event = audit_log.event_type.as_str(), error = %e, "Failed to write audit log");
                }
            });
        } else if let Err(e) = self.repository.create(&audit_log).await {
            warn!(event = audit_log.event_type.as_str(), error = %e, "Failed to write audit log");
        }
    }
}
