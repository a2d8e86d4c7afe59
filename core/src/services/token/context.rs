//! Collaborators shared by the token services

use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use super::config::TokenServiceConfig;
use super::secret::SecretGenerator;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::TokenRepository;
use crate::services::audit::AuditService;
use crate::services::clock::Clock;

/// Store, clock, secret source and audit sink used by every token service
pub struct TokenContext<R: TokenRepository> {
    pub repository: Arc<R>,
    pub clock: Arc<dyn Clock>,
    pub generator: Arc<dyn SecretGenerator>,
    pub audit: Arc<AuditService>,
    pub config: TokenServiceConfig,
}

impl<R: TokenRepository> TokenContext<R> {
    pub fn new(
        repository: Arc<R>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn SecretGenerator>,
        audit: Arc<AuditService>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            repository,
            clock,
            generator,
            audit,
            config,
        }
    }

    /// Run a store call under `store_timeout`
    ///
    /// An elapsed timeout is a `Storage` error, never success.
    pub(crate) async fn bounded<T, F>(&self, operation: &'static str, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Token store call timed out"
                );
                Err(DomainError::storage(format!(
                    "token store call {} timed out",
                    operation
                )))
            }
        }
    }
}

impl<R: TokenRepository> Clone for TokenContext<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            generator: Arc::clone(&self.generator),
            audit: Arc::clone(&self.audit),
            config: self.config.clone(),
        }
    }
}
