//! Configuration for the refresh token services

use session_shared::{RefreshTokenConfig, MIN_SECRET_BYTES};
use std::time::Duration as StdDuration;

use crate::domain::entities::token::REFRESH_TOKEN_EXPIRY_DAYS;
use crate::errors::{DomainError, DomainResult};

/// Configuration for the refresh token services
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Lifetime of every issued or rotated refresh token
    pub refresh_token_ttl: chrono::Duration,
    /// Number of random bytes in each secret
    pub secret_bytes: usize,
    /// Upper bound on each token store call
    pub store_timeout: StdDuration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl: chrono::Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            secret_bytes: 32,
            store_timeout: StdDuration::from_secs(5),
        }
    }
}

impl TokenServiceConfig {
    /// Same bounds as [`RefreshTokenConfig::validate`]
    pub fn validate(&self) -> DomainResult<()> {
        if self.secret_bytes < MIN_SECRET_BYTES {
            return Err(DomainError::Validation {
                message: format!(
                    "secret_bytes must be at least {}, got {}",
                    MIN_SECRET_BYTES, self.secret_bytes
                ),
            });
        }
        if self.refresh_token_ttl <= chrono::Duration::zero() {
            return Err(DomainError::Validation {
                message: "refresh token lifetime must be positive".to_string(),
            });
        }
        if self.store_timeout.is_zero() {
            return Err(DomainError::Validation {
                message: "store timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<&RefreshTokenConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(config: &RefreshTokenConfig) -> Result<Self, Self::Error> {
        config.validate().map_err(|e| DomainError::Validation {
            message: e.to_string(),
        })?;

        Ok(Self {
            refresh_token_ttl: chrono::Duration::seconds(config.ttl_seconds),
            secret_bytes: config.secret_bytes,
            store_timeout: StdDuration::from_millis(config.store_timeout_ms),
        })
    }
}
