//! Refresh token entity and its lifecycle states.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};

/// Default refresh token lifetime (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Why a refresh token was revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevocationReason {
    /// Exchanged for a successor
    Rotated,
    /// Part of a family cascade triggered by replay
    ReuseDetected,
    /// Explicit logout of a single session
    Logout,
    /// Password change, account lock or "sign out everywhere"
    UserRevoked,
    /// Operator-initiated family revocation
    Administrative,
    /// Housekeeping of a lapsed token
    Expired,
}

impl RevocationReason {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotated => "ROTATED",
            Self::ReuseDetected => "REUSE_DETECTED",
            Self::Logout => "LOGOUT",
            Self::UserRevoked => "USER_REVOKED",
            Self::Administrative => "ADMINISTRATIVE",
            Self::Expired => "EXPIRED",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ROTATED" => Some(Self::Rotated),
            "REUSE_DETECTED" => Some(Self::ReuseDetected),
            "LOGOUT" => Some(Self::Logout),
            "USER_REVOKED" => Some(Self::UserRevoked),
            "ADMINISTRATIVE" => Some(Self::Administrative),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of a stored token at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Not revoked and not expired
    Valid,
    /// Lapsed but never revoked
    Expired,
    /// Revoked, for the recorded reason
    Revoked(Option<RevocationReason>),
}

/// Refresh token record stored in the token store
///
/// Only the SHA-256 hash of the secret is kept. All records descending from
/// one login share `family_id` and `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the refresh token
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: Uuid,

    /// Lineage identifier, constant across rotations from one login
    pub family_id: Uuid,

    /// Token this one was rotated from; `None` for the family root
    pub parent_id: Option<Uuid>,

    /// Hashed token value
    pub token_hash: String,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked; never flips back
    pub is_revoked: bool,

    /// Timestamp when the token was revoked
    pub revoked_at: Option<DateTime<Utc>>,

    /// Why the token was revoked
    pub revocation_reason: Option<RevocationReason>,
}

impl RefreshToken {
    /// Creates the root token of a brand-new family
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` if `ttl` is not positive.
    pub fn new_family(
        user_id: Uuid,
        token_hash: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        Self::build(user_id, Uuid::new_v4(), None, token_hash, issued_at, ttl)
    }

    /// Creates the successor of this token within the same family
    pub fn successor(
        &self,
        token_hash: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        Self::build(
            self.user_id,
            self.family_id,
            Some(self.id),
            token_hash,
            issued_at,
            ttl,
        )
    }

    fn build(
        user_id: Uuid,
        family_id: Uuid,
        parent_id: Option<Uuid>,
        token_hash: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "refresh token lifetime must be positive".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            family_id,
            parent_id,
            token_hash,
            created_at: issued_at,
            expires_at: issued_at + ttl,
            is_revoked: false,
            revoked_at: None,
            revocation_reason: None,
        })
    }

    /// Checks if the token has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A token is valid if it has neither expired nor been revoked
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    /// Revocation takes precedence over expiry
    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.is_revoked {
            TokenState::Revoked(self.revocation_reason)
        } else if self.is_expired_at(now) {
            TokenState::Expired
        } else {
            TokenState::Valid
        }
    }

    /// Revokes the token; returns `false` if it was already revoked
    pub fn revoke(&mut self, reason: RevocationReason, now: DateTime<Utc>) -> bool {
        if self.is_revoked {
            return false;
        }
        self.is_revoked = true;
        self.revoked_at = Some(now);
        self.revocation_reason = Some(reason);
        true
    }

    /// Time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}
