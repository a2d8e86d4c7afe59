//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RevocationReason};
use crate::errors::DomainError;

/// Result of an atomic rotation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The predecessor was flipped to revoked and the successor inserted
    Rotated(RefreshToken),
    /// The predecessor was already revoked; nothing was written
    AlreadyRevoked,
}

/// Repository trait for RefreshToken entity persistence operations
///
/// Every revocation is a conditional "set revoked where not revoked" update,
/// so `is_revoked` is monotonic and `revoked_at` is written exactly once.
/// Records are never deleted.
///
/// Infrastructure failures must be reported as `DomainError::Storage`.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token to the repository
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError::Validation)` - A token with the same hash already exists
    /// * `Err(DomainError::Storage)` - Save failed; nothing was persisted
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use session_core::repositories::TokenRepository;
    /// # use session_core::domain::entities::token::RefreshToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = RefreshToken::new_family(
    ///     Uuid::new_v4(),
    ///     "hashed_token_value".to_string(),
    ///     Utc::now(),
    ///     Duration::days(7),
    /// )?;
    ///
    /// let saved = repo.save_refresh_token(token).await?;
    /// println!("Token saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found
    /// * `Ok(None)` - No token found with given hash
    /// * `Err(DomainError)` - Database error occurred
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find a refresh token by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshToken>, DomainError>;

    /// Find every token in a family, oldest first
    async fn find_by_family(&self, family_id: Uuid) -> Result<Vec<RefreshToken>, DomainError>;

    /// Find all valid (non-expired at `now`, non-revoked) tokens for a user,
    /// newest first
    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError>;

    /// Atomically rotate `predecessor_id` into `successor`
    ///
    /// Flips the predecessor to revoked (reason `Rotated`, `revoked_at = now`)
    /// only if it is currently not revoked, and inserts `successor` in the same
    /// transaction. When the flip does not happen, nothing is written and
    /// `RotationOutcome::AlreadyRevoked` is returned. Of any number of
    /// concurrent calls for the same predecessor, at most one returns
    /// `RotationOutcome::Rotated`.
    ///
    /// # Returns
    /// * `Ok(RotationOutcome)` - Whether this call performed the rotation
    /// * `Err(DomainError::NotFound)` - The predecessor does not exist
    /// * `Err(DomainError)` - Database error; no partial state is visible
    async fn rotate_refresh_token(
        &self,
        predecessor_id: Uuid,
        successor: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RotationOutcome, DomainError>;

    /// Revoke a specific refresh token
    ///
    /// # Returns
    /// * `Ok(true)` - Token was revoked by this call
    /// * `Ok(false)` - Token not found or already revoked
    async fn revoke_token(
        &self,
        id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Revoke every non-revoked token in a family in one transaction
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens revoked (0 if already fully revoked)
    async fn revoke_token_family(
        &self,
        family_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Revoke every non-revoked token of a user, across all families, in one
    /// transaction
    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        reason: RevocationReason,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Revoke (reason `Expired`) every non-revoked token expired at `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of expired tokens revoked
    async fn revoke_expired_tokens(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count active tokens for a user
    async fn count_active_tokens(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let tokens = self.find_active_by_user(user_id, now).await?;
        Ok(tokens.len())
    }
}
