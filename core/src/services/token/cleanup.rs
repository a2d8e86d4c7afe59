//! Token cleanup service for periodic expiry sweeps
//!
//! Expired tokens are marked revoked, never deleted, so the audit trail and
//! family history survive.

use session_shared::CleanupConfig;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::service::RefreshTokenService;
use crate::repositories::TokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            enabled: config.enabled,
        }
    }
}

/// Service that sweeps expired refresh tokens on an interval
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    tokens: Arc<RefreshTokenService<R>>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository + 'static> TokenCleanupService<R> {
    /// Create a new token cleanup service
    pub fn new(tokens: Arc<RefreshTokenService<R>>, config: TokenCleanupConfig) -> Self {
        Self { tokens, config }
    }

    /// Run a single cleanup cycle
    ///
    /// Sweep failures are collected in `CleanupResult::errors`; the next
    /// cycle retries them.
    pub async fn run_cleanup(&self) -> CleanupResult {
        if !self.config.enabled {
            return CleanupResult::default();
        }

        info!("Starting token cleanup cycle");

        let mut result = CleanupResult::default();

        match self.tokens.sweep_expired().await {
            Ok(count) => {
                result.expired_tokens_revoked = count;
            }
            Err(e) => {
                error!("Failed to sweep expired tokens: {}", e);
                result.errors.push(format!("Expiry sweep error: {}", e));
            }
        }

        info!(
            "Token cleanup completed - Expired tokens revoked: {}",
            result.expired_tokens_revoked
        );

        result
    }

    /// Start the cleanup service as a background task
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!("Cleanup completed with errors: {:?}", result.errors);
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh tokens marked revoked
    pub expired_tokens_revoked: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
