//! MySQL implementation of the AuditLogRepository trait.
//!
//! Audit rows live in `token_audit_log` and are insert-only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use session_core::domain::entities::audit::{AuditEventType, AuditLog, AuditOutcome};
use session_core::errors::DomainError;
use session_core::repositories::AuditLogRepository;

const AUDIT_COLUMNS: &str = "id, event_type, user_id, family_id, token_id, outcome, reason, \
    CAST(event_data AS CHAR) AS event_data, created_at";

/// MySQL implementation of AuditLogRepository
pub struct MySqlAuditLogRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAuditLogRepository {
    /// Create a new MySQL audit log repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn optional_uuid(
        row: &sqlx::mysql::MySqlRow,
        column: &str,
    ) -> Result<Option<Uuid>, DomainError> {
        let value: Option<String> = row.try_get(column).map_err(|e| DomainError::Internal {
            message: format!("Failed to get {}: {}", column, e),
        })?;

        value
            .map(|id| Uuid::parse_str(&id))
            .transpose()
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid UUID in {}: {}", column, e),
            })
    }

    /// Convert database row to AuditLog entity
    fn row_to_audit_log(row: &sqlx::mysql::MySqlRow) -> Result<AuditLog, DomainError> {
        let internal = |column: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", column, e),
        };

        let id: String = row.try_get("id").map_err(|e| internal("id", e))?;

        let event_type_str: String = row
            .try_get("event_type")
            .map_err(|e| internal("event_type", e))?;
        let event_type = AuditEventType::parse(&event_type_str).ok_or_else(|| {
            DomainError::Internal {
                message: format!("Unknown event type: {}", event_type_str),
            }
        })?;

        let outcome_str: String = row.try_get("outcome").map_err(|e| internal("outcome", e))?;
        let outcome = AuditOutcome::parse(&outcome_str).ok_or_else(|| DomainError::Internal {
            message: format!("Unknown outcome: {}", outcome_str),
        })?;

        let event_data: Option<String> = row
            .try_get("event_data")
            .map_err(|e| internal("event_data", e))?;
        let event_data = event_data
            .map(|raw| serde_json::from_str::<JsonValue>(&raw))
            .transpose()
            .map_err(|e| DomainError::Internal {
                message: format!("Invalid event_data JSON: {}", e),
            })?;

        Ok(AuditLog {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid audit log UUID: {}", e),
            })?,
            event_type,
            user_id: Self::optional_uuid(row, "user_id")?,
            family_id: Self::optional_uuid(row, "family_id")?,
            token_id: Self::optional_uuid(row, "token_id")?,
            outcome,
            reason: row.try_get("reason").map_err(|e| internal("reason", e))?,
            event_data,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| internal("created_at", e))?,
        })
    }

    async fn find_where(
        &self,
        column: &'static str,
        value: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        let query = format!(
            "SELECT {} FROM token_audit_log WHERE {} = ? ORDER BY created_at DESC LIMIT ?",
            AUDIT_COLUMNS, column
        );

        let rows = sqlx::query(&query)
            .bind(value.to_string())
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query audit logs: {}", e)))?;

        rows.iter().map(Self::row_to_audit_log).collect()
    }
}

#[async_trait]
impl AuditLogRepository for MySqlAuditLogRepository {
    async fn create(&self, audit_log: &AuditLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO token_audit_log (
                id, event_type, user_id, family_id, token_id,
                outcome, reason, event_data, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(audit_log.id.to_string())
            .bind(audit_log.event_type.as_str())
            .bind(audit_log.user_id.map(|id| id.to_string()))
            .bind(audit_log.family_id.map(|id| id.to_string()))
            .bind(audit_log.token_id.map(|id| id.to_string()))
            .bind(audit_log.outcome.as_str())
            .bind(audit_log.reason.as_deref())
            .bind(audit_log.event_data.as_ref().map(|data| data.to_string()))
            .bind(audit_log.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create audit log: {}", e)))?;

        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        self.find_where("user_id", user_id, limit).await
    }

    async fn find_by_family(
        &self,
        family_id: Uuid,
        limit: usize,
    ) -> Result<Vec<AuditLog>, DomainError> {
        self.find_where("family_id", family_id, limit).await
    }
}
