//! Explicit and housekeeping revocation

use tracing::info;
use uuid::Uuid;

use super::context::TokenContext;
use super::secret::hash_secret;
use crate::domain::entities::audit::{AuditEventType, AuditLog, AuditOutcome};
use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;

/// Logout, mass revocation and expiry sweep
pub struct RevocationService<R: TokenRepository> {
    ctx: TokenContext<R>,
}

impl<R: TokenRepository> RevocationService<R> {
    pub fn new(ctx: TokenContext<R>) -> Self {
        Self { ctx }
    }

    /// Revoke one token by id
    ///
    /// Returns `false` when the token is unknown or already revoked.
    pub async fn revoke_token(&self, token_id: Uuid, reason: RevocationReason) -> DomainResult<bool> {
        let record = self
            .ctx
            .bounded("find_by_id", self.ctx.repository.find_by_id(token_id))
            .await?;

        match record {
            Some(record) => self.revoke_record(&record, reason).await,
            None => Ok(false),
        }
    }

    /// Logout by presenting the plaintext secret
    ///
    /// An unknown secret is a silent no-op.
    pub async fn revoke_presented(&self, presented: &str) -> DomainResult<bool> {
        let token_hash = hash_secret(presented);
        let record = self
            .ctx
            .bounded(
                "find_refresh_token",
                self.ctx.repository.find_refresh_token(&token_hash),
            )
            .await?;

        let Some(record) = record else {
            return Ok(false);
        };

        self.revoke_record(&record, RevocationReason::Logout).await
    }

    /// Conditional flip of one stored record, audited with its owner and family
    async fn revoke_record(&self, record: &RefreshToken, reason: RevocationReason) -> DomainResult<bool> {
        let now = self.ctx.clock.now();
        let revoked = self
            .ctx
            .bounded(
                "revoke_token",
                self.ctx.repository.revoke_token(record.id, reason, now),
            )
            .await?;

        if revoked {
            info!(
                user_id = %record.user_id,
                family_id = %record.family_id,
                token_id = %record.id,
                reason = reason.as_str(),
                "Refresh token revoked"
            );
            self.ctx
                .audit
                .record(
                    AuditLog::new(AuditEventType::TokenRevoked, AuditOutcome::Success, now)
                        .with_user(record.user_id)
                        .with_family(record.family_id)
                        .with_token_id(record.id)
                        .with_reason(reason.as_str()),
                )
                .await;
        }

        Ok(revoked)
    }

    /// Revoke every live token of a user across all families
    pub async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
    ) -> DomainResult<usize> {
        let now = self.ctx.clock.now();
        let revoked = self
            .ctx
            .bounded(
                "revoke_all_user_tokens",
                self.ctx
                    .repository
                    .revoke_all_user_tokens(user_id, reason, now),
            )
            .await?;

        info!(user_id = %user_id, reason = reason.as_str(), revoked, "Revoked all user tokens");
        self.ctx
            .audit
            .record(
                AuditLog::new(AuditEventType::UserTokensRevoked, AuditOutcome::Success, now)
                    .with_user(user_id)
                    .with_reason(reason.as_str())
                    .with_event_data(serde_json::json!({ "revoked": revoked })),
            )
            .await;

        Ok(revoked)
    }

    /// Mark expired, unrevoked tokens as revoked
    ///
    /// Siblings in the same family are left alone.
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        let now = self.ctx.clock.now();
        let revoked = self
            .ctx
            .bounded(
                "revoke_expired_tokens",
                self.ctx.repository.revoke_expired_tokens(now),
            )
            .await?;

        if revoked > 0 {
            info!(revoked, "Swept expired refresh tokens");
            self.ctx
                .audit
                .record(
                    AuditLog::new(AuditEventType::ExpiredTokensSwept, AuditOutcome::Success, now)
                        .with_reason(RevocationReason::Expired.as_str())
                        .with_event_data(serde_json::json!({ "revoked": revoked })),
                )
                .await;
        }

        Ok(revoked)
    }

    /// Currently valid tokens of a user, newest first
    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        let now = self.ctx.clock.now();
        self.ctx
            .bounded(
                "find_active_by_user",
                self.ctx.repository.find_active_by_user(user_id, now),
            )
            .await
    }
}
