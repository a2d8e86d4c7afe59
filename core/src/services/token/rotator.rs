//! Refresh token rotation state machine
//!
//! Each record is used for rotation at most once: `Valid -> Rotated`, never
//! re-entered. The flip of the predecessor and the insert of its successor
//! happen in one store operation, and only when the predecessor is still
//! unrevoked, so concurrent rotations of one token have a single winner.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::context::TokenContext;
use super::issuer::IssuedToken;
use super::reuse_detector::ReuseDetector;
use super::secret::hash_secret;
use crate::domain::entities::audit::{AuditEventType, AuditLog, AuditOutcome};
use crate::domain::entities::token::{RefreshToken, RevocationReason, TokenState};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{RotationOutcome, TokenRepository};

pub struct TokenRotator<R: TokenRepository> {
    ctx: TokenContext<R>,
    detector: ReuseDetector<R>,
}

impl<R: TokenRepository> TokenRotator<R> {
    pub fn new(ctx: TokenContext<R>) -> Self {
        let detector = ReuseDetector::new(ctx.clone());
        Self { ctx, detector }
    }

    /// Exchange a presented secret for a new one in the same family
    ///
    /// # Errors
    /// * `TokenError::InvalidToken` - No record matches the secret
    /// * `TokenError::ExpiredToken` - The record lapsed before use
    /// * `TokenError::ReuseDetected` - The record was already revoked; its
    ///   family has now been revoked
    /// * `DomainError::Storage` - The store failed or timed out
    pub async fn rotate(&self, presented: &str) -> DomainResult<IssuedToken> {
        let now = self.ctx.clock.now();
        let record = match self.lookup(presented).await? {
            Some(record) => record,
            None => return Err(self.reject_unknown(now).await),
        };

        match record.state_at(now) {
            TokenState::Valid => {}
            TokenState::Expired | TokenState::Revoked(Some(RevocationReason::Expired)) => {
                return Err(self.reject_expired(&record, now).await);
            }
            TokenState::Revoked(_) => return Err(self.reuse(&record).await),
        }

        let secret = self.ctx.generator.generate()?;
        let successor = record.successor(
            hash_secret(secret.expose()),
            now,
            self.ctx.config.refresh_token_ttl,
        )?;

        let outcome = self
            .ctx
            .bounded(
                "rotate_refresh_token",
                self.ctx
                    .repository
                    .rotate_refresh_token(record.id, successor, now),
            )
            .await?;

        match outcome {
            RotationOutcome::Rotated(successor) => {
                info!(
                    user_id = %successor.user_id,
                    family_id = %successor.family_id,
                    "Rotated refresh token"
                );
                self.ctx
                    .audit
                    .record(
                        AuditLog::new(AuditEventType::TokenRotated, AuditOutcome::Success, now)
                            .with_user(successor.user_id)
                            .with_family(successor.family_id)
                            .with_token_id(successor.id)
                            .with_event_data(serde_json::json!({ "parent_id": record.id })),
                    )
                    .await;
                Ok(IssuedToken {
                    secret,
                    record: successor,
                })
            }
            RotationOutcome::AlreadyRevoked => {
                // A concurrent caller flipped the record between lookup and rotate
                debug!(token_id = %record.id, "Lost rotation race");
                let current = self
                    .ctx
                    .bounded("find_by_id", self.ctx.repository.find_by_id(record.id))
                    .await?
                    .unwrap_or(record);
                if current.revocation_reason == Some(RevocationReason::Expired) {
                    Err(self.reject_expired(&current, now).await)
                } else {
                    Err(self.reuse(&current).await)
                }
            }
        }
    }

    /// Read-only check that a presented secret names a live session
    ///
    /// Never mutates state. A revoked token reports `InvalidToken`.
    pub async fn validate(&self, presented: &str) -> DomainResult<RefreshToken> {
        let now = self.ctx.clock.now();
        let record = self
            .lookup(presented)
            .await?
            .ok_or(TokenError::InvalidToken)?;

        match record.state_at(now) {
            TokenState::Valid => Ok(record),
            TokenState::Expired | TokenState::Revoked(Some(RevocationReason::Expired)) => {
                Err(TokenError::ExpiredToken.into())
            }
            TokenState::Revoked(_) => Err(TokenError::InvalidToken.into()),
        }
    }

    /// Malformed input is hashed and looked up like any other
    async fn lookup(&self, presented: &str) -> DomainResult<Option<RefreshToken>> {
        let token_hash = hash_secret(presented);
        self.ctx
            .bounded(
                "find_refresh_token",
                self.ctx.repository.find_refresh_token(&token_hash),
            )
            .await
    }

    async fn reuse(&self, record: &RefreshToken) -> DomainError {
        match self
            .detector
            .revoke_family_of(record, RevocationReason::ReuseDetected)
            .await
        {
            Ok(_) => TokenError::ReuseDetected.into(),
            Err(e) => {
                warn!(family_id = %record.family_id, error = %e, "Family revocation after reuse failed");
                e
            }
        }
    }

    async fn reject_unknown(&self, now: DateTime<Utc>) -> DomainError {
        debug!("Rotation rejected: unknown refresh token");
        self.ctx
            .audit
            .record(
                AuditLog::new(AuditEventType::RotationRejected, AuditOutcome::Failure, now)
                    .with_reason("unknown token"),
            )
            .await;
        TokenError::InvalidToken.into()
    }

    async fn reject_expired(&self, record: &RefreshToken, now: DateTime<Utc>) -> DomainError {
        debug!(family_id = %record.family_id, "Rotation rejected: refresh token expired");
        self.ctx
            .audit
            .record(
                AuditLog::new(AuditEventType::RotationRejected, AuditOutcome::Failure, now)
                    .with_user(record.user_id)
                    .with_family(record.family_id)
                    .with_token_id(record.id)
                    .with_reason("expired"),
            )
            .await;
        TokenError::ExpiredToken.into()
    }
}
