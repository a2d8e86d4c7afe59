//! Refresh-token configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Shortest secret accepted; 16 random bytes is 128 bits of entropy
pub const MIN_SECRET_BYTES: usize = 16;

/// Refresh-token lifetime and store access settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshTokenConfig {
    /// Lifetime of every issued or rotated refresh token, in seconds
    pub ttl_seconds: i64,

    /// Number of random bytes in a generated secret
    #[serde(default = "default_secret_bytes")]
    pub secret_bytes: usize,

    /// Upper bound on a single store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for RefreshTokenConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 604800, // 7 days
            secret_bytes: default_secret_bytes(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl RefreshTokenConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env_or("REFRESH_TOKEN_TTL_SECONDS", defaults.ttl_seconds),
            secret_bytes: env_or("REFRESH_TOKEN_SECRET_BYTES", defaults.secret_bytes),
            store_timeout_ms: env_or("TOKEN_STORE_TIMEOUT_MS", defaults.store_timeout_ms),
        }
    }

    /// Set token lifetime in days
    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl_seconds = days * 86400;
        self
    }

    /// Reject settings that would make every session guessable or unusable
    ///
    /// # Errors
    /// `ConfigError::Message` naming the offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_bytes < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "refresh_token.secret_bytes must be at least {}, got {}",
                MIN_SECRET_BYTES, self.secret_bytes
            )));
        }
        if self.ttl_seconds <= 0 {
            return Err(ConfigError::Message(format!(
                "refresh_token.ttl_seconds must be positive, got {}",
                self.ttl_seconds
            )));
        }
        if self.store_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "refresh_token.store_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Background expiry sweep settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,

    /// Whether to run the sweep at all
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // every hour
            enabled: true,
        }
    }
}

impl CleanupConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval_seconds: env_or("TOKEN_SWEEP_INTERVAL_SECONDS", defaults.interval_seconds),
            enabled: env_or("TOKEN_SWEEP_ENABLED", defaults.enabled),
        }
    }

    /// An enabled sweep needs a non-zero interval
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.interval_seconds == 0 {
            return Err(ConfigError::Message(
                "cleanup.interval_seconds must be positive when the sweep is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_secret_bytes() -> usize {
    32
}

fn default_store_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_defaults() {
        let config = RefreshTokenConfig::default();
        assert_eq!(config.ttl_seconds, 604800);
        assert_eq!(config.secret_bytes, 32);
        assert_eq!(config.store_timeout_ms, 5000);
    }

    #[test]
    fn test_ttl_builder() {
        let config = RefreshTokenConfig::default().with_ttl_days(30);
        assert_eq!(config.ttl_seconds, 2592000);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(RefreshTokenConfig::default().validate().is_ok());
        assert!(CleanupConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        for secret_bytes in [0, 1, 8, MIN_SECRET_BYTES - 1] {
            let config = RefreshTokenConfig {
                secret_bytes,
                ..RefreshTokenConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("secret_bytes"));
        }

        let config = RefreshTokenConfig {
            secret_bytes: MIN_SECRET_BYTES,
            ..RefreshTokenConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        for ttl_seconds in [0, -1] {
            let config = RefreshTokenConfig {
                ttl_seconds,
                ..RefreshTokenConfig::default()
            };
            assert!(config.validate().unwrap_err().to_string().contains("ttl_seconds"));
        }
    }

    #[test]
    fn test_zero_store_timeout_rejected() {
        let config = RefreshTokenConfig {
            store_timeout_ms: 0,
            ..RefreshTokenConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("store_timeout_ms"));
    }

    #[test]
    fn test_zero_sweep_interval_rejected_only_when_enabled() {
        let mut config = CleanupConfig {
            interval_seconds: 0,
            enabled: true,
        };
        assert!(config.validate().is_err());

        config.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("SESSION_SHARED_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("SESSION_SHARED_TEST_GARBAGE", 42u64), 42);
        assert_eq!(env_or("SESSION_SHARED_TEST_MISSING", true), true);
    }
}
