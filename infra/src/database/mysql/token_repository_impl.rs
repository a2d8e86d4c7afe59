//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh token rows are keyed by the SHA-256 hash of the secret. Every
//! revocation is an `UPDATE ... WHERE is_revoked = FALSE`, so a row is flipped
//! at most once. Rotation runs the conditional flip and the successor insert
//! inside one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use session_core::domain::entities::token::{RefreshToken, RevocationReason};
use session_core::errors::DomainError;
use session_core::repositories::{RotationOutcome, TokenRepository};

const TOKEN_COLUMNS: &str = "id, user_id, family_id, parent_id, token_hash, created_at, \
    expires_at, is_revoked, revoked_at, revocation_reason";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Map a driver error; duplicate hashes are a validation failure, the
    /// rest are storage faults
    fn db_error(context: &str, err: sqlx::Error) -> DomainError {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DomainError::Validation {
                    message: "Token already exists".to_string(),
                };
            }
        }
        DomainError::storage(format!("{}: {}", context, err))
    }

    fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DomainError> {
        Uuid::parse_str(value).map_err(|e| DomainError::Internal {
            message: format!("Invalid UUID in {}: {}", column, e),
        })
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let column_error = |column: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", column, e),
        };

        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| column_error("user_id", e))?;
        let family_id: String = row
            .try_get("family_id")
            .map_err(|e| column_error("family_id", e))?;
        let parent_id: Option<String> = row
            .try_get("parent_id")
            .map_err(|e| column_error("parent_id", e))?;
        let reason: Option<String> = row
            .try_get("revocation_reason")
            .map_err(|e| column_error("revocation_reason", e))?;

        let revocation_reason = reason
            .map(|r| {
                RevocationReason::parse(&r).ok_or_else(|| DomainError::Internal {
                    message: format!("Unknown revocation reason: {}", r),
                })
            })
            .transpose()?;

        Ok(RefreshToken {
            id: Self::parse_uuid(&id, "id")?,
            user_id: Self::parse_uuid(&user_id, "user_id")?,
            family_id: Self::parse_uuid(&family_id, "family_id")?,
            parent_id: parent_id
                .map(|p| Self::parse_uuid(&p, "parent_id"))
                .transpose()?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| column_error("token_hash", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column_error("expires_at", e))?,
            is_revoked: row
                .try_get("is_revoked")
                .map_err(|e| column_error("is_revoked", e))?,
            revoked_at: row
                .try_get::<Option<DateTime<Utc>>, _>("revoked_at")
                .map_err(|e| column_error("revoked_at", e))?,
            revocation_reason,
        })
    }

    fn rows_to_tokens(rows: Vec<sqlx::mysql::MySqlRow>) -> Result<Vec<RefreshToken>, DomainError> {
        rows.iter().map(Self::row_to_token).collect()
    }

    const INSERT_TOKEN: &'static str = r#"
        INSERT INTO refresh_tokens (
            id, user_id, family_id, parent_id, token_hash, created_at,
            expires_at, is_revoked, revoked_at, revocation_reason
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#;

    fn insert_query(
        token: &RefreshToken,
    ) -> sqlx::query::Query<'_, sqlx::MySql, sqlx::mysql::MySqlArguments> {
        sqlx::query(Self::INSERT_TOKEN)
            .bind(token.id.to_string())
            .bind(token.user_id.to_string())
            .bind(token.family_id.to_string())
            .bind(token.parent_id.map(|p| p.to_string()))
            .bind(&token.token_hash)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_revoked)
            .bind(token.revoked_at)
            .bind(token.revocation_reason.map(|r| r.as_str()))
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        Self::insert_query(&token)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to save refresh token", e))?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = ? LIMIT 1",
            TOKEN_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to find refresh token", e))?;

        result.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("SELECT {} FROM refresh_tokens WHERE id = ? LIMIT 1", TOKEN_COLUMNS);

        let result = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to find token by id", e))?;

        result.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_by_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM refresh_tokens WHERE family_id = ? ORDER BY created_at ASC",
            TOKEN_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(family_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to find token family", e))?;

        Self::rows_to_tokens(rows)
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            r#"SELECT {} FROM refresh_tokens
               WHERE user_id = ? AND is_revoked = FALSE AND expires_at > ?
               ORDER BY created_at DESC"#,
            TOKEN_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Self::db_error("Failed to find user tokens", e))?;

        Self::rows_to_tokens(rows)
    }

    async fn rotate_refresh_token(
        &self,
        predecessor_id: Uuid,
        successor: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_error("Failed to begin rotation", e))?;

        let flipped = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(RevocationReason::Rotated.as_str())
        .bind(predecessor_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_error("Failed to revoke rotated token", e))?;

        if flipped.rows_affected() != 1 {
            let exists = sqlx::query("SELECT 1 FROM refresh_tokens WHERE id = ?")
                .bind(predecessor_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| Self::db_error("Failed to check rotated token", e))?;
            tx.rollback()
                .await
                .map_err(|e| Self::db_error("Failed to roll back rotation", e))?;

            return match exists {
                Some(_) => Ok(RotationOutcome::AlreadyRevoked),
                None => Err(DomainError::NotFound {
                    resource: format!("refresh token {}", predecessor_id),
                }),
            };
        }

        // Dropping the transaction on error rolls the flip back
        Self::insert_query(&successor)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_error("Failed to insert successor token", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_error("Failed to commit rotation", e))?;

        Ok(RotationOutcome::Rotated(successor))
    }

    async fn revoke_token(
        &self,
        id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(reason.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to revoke token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_token_family(
        &self,
        family_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE family_id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(reason.as_str())
        .bind(family_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to revoke token family", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE user_id = ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(reason.as_str())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to revoke user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_at = ?, revocation_reason = ?
            WHERE expires_at <= ? AND is_revoked = FALSE
            "#,
        )
        .bind(now)
        .bind(RevocationReason::Expired.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::db_error("Failed to revoke expired tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}
