//! Creation of new token families at login

use tracing::info;
use uuid::Uuid;

use super::context::TokenContext;
use super::secret::{hash_secret, RefreshSecret};
use crate::domain::entities::audit::{AuditEventType, AuditLog, AuditOutcome};
use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;

/// A freshly minted refresh token
///
/// The plaintext `secret` exists only here; the store keeps its hash.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub secret: RefreshSecret,
    pub record: RefreshToken,
}

/// Issues the root token of a new family
pub struct TokenIssuer<R: TokenRepository> {
    ctx: TokenContext<R>,
}

impl<R: TokenRepository> TokenIssuer<R> {
    pub fn new(ctx: TokenContext<R>) -> Self {
        Self { ctx }
    }

    /// Start a new session for `user_id`
    ///
    /// The single insert is the only write, so a storage failure leaves
    /// nothing behind.
    pub async fn issue(&self, user_id: Uuid) -> DomainResult<IssuedToken> {
        let now = self.ctx.clock.now();
        let secret = self.ctx.generator.generate()?;
        let record = RefreshToken::new_family(
            user_id,
            hash_secret(secret.expose()),
            now,
            self.ctx.config.refresh_token_ttl,
        )?;

        let record = self
            .ctx
            .bounded(
                "save_refresh_token",
                self.ctx.repository.save_refresh_token(record),
            )
            .await?;

        info!(
            user_id = %record.user_id,
            family_id = %record.family_id,
            expires_at = %record.expires_at,
            "Issued new refresh token family"
        );
        self.ctx
            .audit
            .record(
                AuditLog::new(AuditEventType::TokenIssued, AuditOutcome::Success, now)
                    .with_user(record.user_id)
                    .with_family(record.family_id)
                    .with_token_id(record.id),
            )
            .await;

        Ok(IssuedToken { secret, record })
    }
}
