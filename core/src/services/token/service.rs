//! Refresh token service facade
//!
//! Wires the issuer, rotator, reuse detector and revocation service over one
//! shared store and exposes the operations the session layer calls.

use std::sync::Arc;
use uuid::Uuid;

use super::config::TokenServiceConfig;
use super::context::TokenContext;
use super::issuer::{IssuedToken, TokenIssuer};
use super::reuse_detector::ReuseDetector;
use super::revocation::RevocationService;
use super::rotator::TokenRotator;
use super::secret::{OsSecretGenerator, SecretGenerator};
use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainResult;
use crate::repositories::TokenRepository;
use crate::services::audit::AuditService;
use crate::services::clock::{Clock, SystemClock};

/// Refresh token service for session issuance, rotation and revocation
pub struct RefreshTokenService<R: TokenRepository> {
    issuer: TokenIssuer<R>,
    rotator: TokenRotator<R>,
    detector: ReuseDetector<R>,
    revocation: RevocationService<R>,
}

impl<R: TokenRepository> RefreshTokenService<R> {
    /// Create a new service with the system clock and OS random source
    pub fn new(repository: Arc<R>, audit: Arc<AuditService>, config: TokenServiceConfig) -> Self {
        let generator = Arc::new(OsSecretGenerator::new(config.secret_bytes));
        Self::with_components(repository, Arc::new(SystemClock), generator, audit, config)
    }

    /// Create a new service with explicit clock and secret source
    pub fn with_components(
        repository: Arc<R>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn SecretGenerator>,
        audit: Arc<AuditService>,
        config: TokenServiceConfig,
    ) -> Self {
        let ctx = TokenContext::new(repository, clock, generator, audit, config);
        Self {
            issuer: TokenIssuer::new(ctx.clone()),
            rotator: TokenRotator::new(ctx.clone()),
            detector: ReuseDetector::new(ctx.clone()),
            revocation: RevocationService::new(ctx),
        }
    }

    /// Start a new token family for `user_id`
    pub async fn issue(&self, user_id: Uuid) -> DomainResult<IssuedToken> {
        self.issuer.issue(user_id).await
    }

    /// Rotate a presented refresh secret
    pub async fn rotate(&self, presented: &str) -> DomainResult<IssuedToken> {
        self.rotator.rotate(presented).await
    }

    /// Check a presented refresh secret without consuming it
    pub async fn validate(&self, presented: &str) -> DomainResult<RefreshToken> {
        self.rotator.validate(presented).await
    }

    /// Logout a single token by id
    pub async fn revoke_token(&self, token_id: Uuid) -> DomainResult<bool> {
        self.revocation
            .revoke_token(token_id, RevocationReason::Logout)
            .await
    }

    /// Logout by presenting the plaintext secret
    pub async fn revoke_presented(&self, presented: &str) -> DomainResult<bool> {
        self.revocation.revoke_presented(presented).await
    }

    /// Revoke every session of a user, e.g. after a password change
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> DomainResult<usize> {
        self.revocation
            .revoke_all_for_user(user_id, RevocationReason::UserRevoked)
            .await
    }

    /// Administratively revoke one token family
    pub async fn revoke_family(&self, family_id: Uuid) -> DomainResult<usize> {
        self.detector
            .revoke_family(family_id, RevocationReason::Administrative)
            .await
    }

    /// Revoke expired tokens; returns the number revoked
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        self.revocation.sweep_expired().await
    }

    /// Currently valid tokens of a user
    pub async fn active_sessions(&self, user_id: Uuid) -> DomainResult<Vec<RefreshToken>> {
        self.revocation.active_sessions(user_id).await
    }
}
