//! In-memory implementation of TokenRepository
//!
//! Backs deterministic tests of the rotation state machine. All mutations take
//! the single write lock, so every operation is serialisable and
//! `rotate_refresh_token` is atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainError;

use super::r#trait::{RotationOutcome, TokenRepository};

#[derive(Default)]
struct Tables {
    by_id: HashMap<Uuid, RefreshToken>,
    by_hash: HashMap<String, Uuid>,
}

impl Tables {
    fn insert(&mut self, token: RefreshToken) -> Result<(), DomainError> {
        if self.by_hash.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }
        self.by_hash.insert(token.token_hash.clone(), token.id);
        self.by_id.insert(token.id, token);
        Ok(())
    }

    fn revoke_where<F>(&mut self, reason: RevocationReason, now: DateTime<Utc>, filter: F) -> usize
    where
        F: Fn(&RefreshToken) -> bool,
    {
        self.by_id
            .values_mut()
            .filter(|token| !token.is_revoked && filter(token))
            .map(|token| token.revoke(reason, now))
            .filter(|flipped| *flipped)
            .count()
    }
}

/// In-memory token repository
///
/// Supports fault injection (`set_unavailable`, `set_latency`) so callers can
/// exercise storage failures and store-call timeouts.
pub struct InMemoryTokenRepository {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryTokenRepository {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            unavailable: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Make every subsequent call fail with `DomainError::Storage`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<RefreshToken> {
        self.tables.read().await.by_id.values().cloned().collect()
    }

    async fn io(&self) -> Result<(), DomainError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::storage("in-memory token store unavailable"));
        }
        Ok(())
    }
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;
        tables.insert(token.clone())?;
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        self.io().await?;
        let tables = self.tables.read().await;
        Ok(tables
            .by_hash
            .get(token_hash)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError> {
        self.io().await?;
        let tables = self.tables.read().await;
        Ok(tables.by_id.get(&id).cloned())
    }

    async fn find_by_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError> {
        self.io().await?;
        let tables = self.tables.read().await;
        let mut tokens: Vec<RefreshToken> = tables
            .by_id
            .values()
            .filter(|t| t.family_id == family_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        Ok(tokens)
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        self.io().await?;
        let tables = self.tables.read().await;
        let mut tokens: Vec<RefreshToken> = tables
            .by_id
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid_at(now))
            .cloned()
            .collect();
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tokens)
    }

    async fn rotate_refresh_token(
        &self,
        predecessor_id: Uuid,
        successor: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;

        let predecessor = tables
            .by_id
            .get(&predecessor_id)
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("refresh token {}", predecessor_id),
            })?;
        if predecessor.is_revoked {
            return Ok(RotationOutcome::AlreadyRevoked);
        }

        // Check the insert can succeed before flipping anything
        if tables.by_hash.contains_key(&successor.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        if let Some(predecessor) = tables.by_id.get_mut(&predecessor_id) {
            predecessor.revoke(RevocationReason::Rotated, now);
        }
        tables.insert(successor.clone())?;

        Ok(RotationOutcome::Rotated(successor))
    }

    async fn revoke_token(
        &self,
        id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .by_id
            .get_mut(&id)
            .map(|token| token.revoke(reason, now))
            .unwrap_or(false))
    }

    async fn revoke_token_family(
        &self,
        family_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;
        Ok(tables.revoke_where(reason, now, |t| t.family_id == family_id))
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;
        Ok(tables.revoke_where(reason, now, |t| t.user_id == user_id))
    }

    async fn revoke_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.io().await?;
        let mut tables = self.tables.write().await;
        Ok(tables.revoke_where(RevocationReason::Expired, now, |t| t.is_expired_at(now)))
    }
}
