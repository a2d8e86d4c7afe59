//! Cascading revocation of a token family
//!
//! A rotated token that comes back means two parties hold the same chain.
//! Neither can be told apart from the other, so the whole family goes.

use tracing::{error, info, warn};
use uuid::Uuid;

use super::context::TokenContext;
use crate::domain::entities::audit::{AuditEventType, AuditLog, AuditOutcome};
use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;

pub struct ReuseDetector<R: TokenRepository> {
    ctx: TokenContext<R>,
}

impl<R: TokenRepository> ReuseDetector<R> {
    pub fn new(ctx: TokenContext<R>) -> Self {
        Self { ctx }
    }

    /// Revoke every non-revoked token in `family_id`
    ///
    /// Idempotent: a fully revoked family yields `Ok(0)`.
    pub async fn revoke_family(
        &self,
        family_id: Uuid,
        reason: RevocationReason,
    ) -> DomainResult<usize> {
        let revoked = self.cascade(family_id, reason).await?;

        // Only the audit entry needs the owner
        let user_id = match self
            .ctx
            .bounded(
                "find_by_family",
                self.ctx.repository.find_by_family(family_id),
            )
            .await
        {
            Ok(tokens) => tokens.first().map(|t| t.user_id),
            Err(e) => {
                warn!(family_id = %family_id, error = %e, "Could not resolve family owner for audit");
                None
            }
        };
        self.audit(family_id, user_id, None, reason, revoked).await;

        Ok(revoked)
    }

    /// Revoke the family of a replayed token
    pub(crate) async fn revoke_family_of(
        &self,
        presented: &RefreshToken,
        reason: RevocationReason,
    ) -> DomainResult<usize> {
        let revoked = self.cascade(presented.family_id, reason).await?;
        self.audit(
            presented.family_id,
            Some(presented.user_id),
            Some(presented.id),
            reason,
            revoked,
        )
        .await;
        Ok(revoked)
    }

    async fn cascade(&self, family_id: Uuid, reason: RevocationReason) -> DomainResult<usize> {
        let now = self.ctx.clock.now();
        self.ctx
            .bounded(
                "revoke_token_family",
                self.ctx
                    .repository
                    .revoke_token_family(family_id, reason, now),
            )
            .await
    }

    async fn audit(
        &self,
        family_id: Uuid,
        user_id: Option<Uuid>,
        token_id: Option<Uuid>,
        reason: RevocationReason,
        revoked: usize,
    ) {
        let event_type = if reason == RevocationReason::ReuseDetected {
            error!(
                target: "auth.token.reuse_detected",
                family_id = %family_id,
                user_id = ?user_id,
                token_id = ?token_id,
                revoked,
                "Refresh token reuse detected; token family revoked"
            );
            AuditEventType::ReuseDetected
        } else {
            info!(
                family_id = %family_id,
                reason = reason.as_str(),
                revoked,
                "Token family revoked"
            );
            AuditEventType::FamilyRevoked
        };

        let mut entry = AuditLog::new(event_type, AuditOutcome::Success, self.ctx.clock.now())
            .with_family(family_id)
            .with_reason(reason.as_str())
            .with_event_data(serde_json::json!({ "revoked": revoked }));
        if let Some(user_id) = user_id {
            entry = entry.with_user(user_id);
        }
        if let Some(token_id) = token_id {
            entry = entry.with_token_id(token_id);
        }
        self.ctx.audit.record(entry).await;
    }
}
