//! Table definitions for the token store and audit log
//!
//! Rows are never deleted by the application; revocation only flips
//! `is_revoked` from FALSE to TRUE.

use sqlx::MySqlPool;

use crate::InfrastructureError;

pub const CREATE_REFRESH_TOKENS: &str = r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id CHAR(36) NOT NULL PRIMARY KEY,
        user_id CHAR(36) NOT NULL,
        family_id CHAR(36) NOT NULL,
        parent_id CHAR(36) NULL,
        token_hash CHAR(64) NOT NULL,
        created_at DATETIME(6) NOT NULL,
        expires_at DATETIME(6) NOT NULL,
        is_revoked BOOLEAN NOT NULL DEFAULT FALSE,
        revoked_at DATETIME(6) NULL,
        revocation_reason VARCHAR(32) NULL,
        UNIQUE KEY uq_refresh_tokens_hash (token_hash),
        KEY idx_refresh_tokens_family (family_id),
        KEY idx_refresh_tokens_user (user_id, is_revoked),
        KEY idx_refresh_tokens_expiry (is_revoked, expires_at)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

pub const CREATE_TOKEN_AUDIT_LOG: &str = r#"
    CREATE TABLE IF NOT EXISTS token_audit_log (
        id CHAR(36) NOT NULL PRIMARY KEY,
        event_type VARCHAR(64) NOT NULL,
        user_id CHAR(36) NULL,
        family_id CHAR(36) NULL,
        token_id CHAR(36) NULL,
        outcome VARCHAR(16) NOT NULL,
        reason VARCHAR(255) NULL,
        event_data JSON NULL,
        created_at DATETIME(6) NOT NULL,
        KEY idx_token_audit_user (user_id, created_at),
        KEY idx_token_audit_family (family_id, created_at)
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Create the tables if they do not exist yet
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    for statement in [CREATE_REFRESH_TOKENS, CREATE_TOKEN_AUDIT_LOG] {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Token store schema is up to date");
    Ok(())
}
