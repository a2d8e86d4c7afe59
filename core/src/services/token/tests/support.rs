//! Shared fixtures for token service tests

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::domain::entities::audit::{AuditEventType, AuditLog};
use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainResult;
use crate::repositories::{InMemoryAuditLogRepository, InMemoryTokenRepository, TokenRepository};
use crate::services::audit::{AuditService, AuditServiceConfig};
use crate::services::clock::ManualClock;
use crate::services::token::{
    OsSecretGenerator, RefreshSecret, RefreshTokenService, SecretGenerator, TokenServiceConfig,
};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

pub struct Harness<R: TokenRepository = InMemoryTokenRepository> {
    pub repo: Arc<R>,
    pub audit_repo: Arc<InMemoryAuditLogRepository>,
    pub clock: Arc<ManualClock>,
    pub service: Arc<RefreshTokenService<R>>,
}

impl Harness<InMemoryTokenRepository> {
    pub fn new() -> Self {
        Self::with_config(TokenServiceConfig::default())
    }

    pub fn with_config(config: TokenServiceConfig) -> Self {
        Harness::over(Arc::new(InMemoryTokenRepository::new()), config)
    }
}

impl<R: TokenRepository> Harness<R> {
    pub fn over(repo: Arc<R>, config: TokenServiceConfig) -> Self {
        let generator = Arc::new(OsSecretGenerator::new(config.secret_bytes));
        Self::over_with_generator(repo, generator, config)
    }

    pub fn over_with_generator(
        repo: Arc<R>,
        generator: Arc<dyn SecretGenerator>,
        config: TokenServiceConfig,
    ) -> Self {
        let audit_repo = Arc::new(InMemoryAuditLogRepository::new());
        let audit = Arc::new(AuditService::new(
            audit_repo.clone(),
            AuditServiceConfig { async_writes: false },
        ));
        let clock = Arc::new(ManualClock::new(start()));
        let service = Arc::new(RefreshTokenService::with_components(
            repo.clone(),
            clock.clone(),
            generator,
            audit,
            config,
        ));
        Self {
            repo,
            audit_repo,
            clock,
            service,
        }
    }

    /// Audit entries of one type, in write order
    pub async fn events(&self, event_type: AuditEventType) -> Vec<AuditLog> {
        self.audit_repo
            .all()
            .await
            .into_iter()
            .filter(|log| log.event_type == event_type)
            .collect()
    }

    pub async fn family(&self, family_id: uuid::Uuid) -> Vec<RefreshToken> {
        self.repo.find_by_family(family_id).await.unwrap()
    }
}

/// Always returns the same secret
pub struct FixedSecretGenerator(pub &'static str);

impl SecretGenerator for FixedSecretGenerator {
    fn generate(&self) -> DomainResult<RefreshSecret> {
        Ok(RefreshSecret::new(self.0))
    }
}

/// Wraps the in-memory store and holds the first `gate` lookups by hash until
/// all of them have read, so concurrent rotations all see the token as valid
pub struct RacingRepository {
    pub inner: InMemoryTokenRepository,
    barrier: tokio::sync::Barrier,
    gate: usize,
    lookups: AtomicUsize,
}

impl RacingRepository {
    pub fn new(gate: usize) -> Self {
        Self {
            inner: InMemoryTokenRepository::new(),
            barrier: tokio::sync::Barrier::new(gate),
            gate,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl TokenRepository for RacingRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> DomainResult<RefreshToken> {
        self.inner.save_refresh_token(token).await
    }

    async fn find_refresh_token(&self, token_hash: &str) -> DomainResult<Option<RefreshToken>> {
        let found = self.inner.find_refresh_token(token_hash).await;
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.gate {
            self.barrier.wait().await;
        }
        found
    }

    async fn find_by_id(&self, id: uuid::Uuid) -> DomainResult<Option<RefreshToken>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_family(&self, family_id: uuid::Uuid) -> DomainResult<Vec<RefreshToken>> {
        self.inner.find_by_family(family_id).await
    }

    async fn find_active_by_user(
        &self,
        user_id: uuid::Uuid,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<RefreshToken>> {
        self.inner.find_active_by_user(user_id, now).await
    }

    async fn rotate_refresh_token(
        &self,
        predecessor_id: uuid::Uuid,
        successor: RefreshToken,
        now: DateTime<Utc>,
    ) -> DomainResult<crate::repositories::RotationOutcome> {
        self.inner
            .rotate_refresh_token(predecessor_id, successor, now)
            .await
    }

    async fn revoke_token(
        &self,
        id: uuid::Uuid,
        reason: crate::domain::entities::token::RevocationReason,
        now: DateTime<Utc>,
    ) -> DomainResult<bool> {
        self.inner.revoke_token(id, reason, now).await
    }

    async fn revoke_token_family(
        &self,
        family_id: uuid::Uuid,
        reason: crate::domain::entities::token::RevocationReason,
        now: DateTime<Utc>,
    ) -> DomainResult<usize> {
        self.inner.revoke_token_family(family_id, reason, now).await
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: uuid::Uuid,
        reason: crate::domain::entities::token::RevocationReason,
        now: DateTime<Utc>,
    ) -> DomainResult<usize> {
        self.inner.revoke_all_user_tokens(user_id, reason, now).await
    }

    async fn revoke_expired_tokens(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        self.inner.revoke_expired_tokens(now).await
    }
}
