//! Background worker that revokes expired refresh tokens on an interval.

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use session_core::{
    AuditService, AuditServiceConfig, RefreshTokenService, TokenCleanupConfig,
    TokenCleanupService, TokenServiceConfig,
};
use session_infra::database::{
    ensure_schema, DatabasePool, MySqlAuditLogRepository, MySqlTokenRepository,
};
use session_shared::{AppConfig, Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment-specific file first, then the plain .env
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    session_infra::logging::init(&config.logging)?;

    info!(environment = %config.environment, "Starting token sweeper");

    let db = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the token store")?;
    db.health_check()
        .await
        .context("token store failed its health check")?;
    ensure_schema(db.get_pool()).await?;

    let audit = Arc::new(AuditService::new(
        Arc::new(MySqlAuditLogRepository::new(db.get_pool().clone())),
        AuditServiceConfig::default(),
    ));
    let tokens = Arc::new(RefreshTokenService::new(
        Arc::new(MySqlTokenRepository::new(db.get_pool().clone())),
        audit,
        TokenServiceConfig::try_from(&config.refresh_token)
            .context("invalid refresh token settings")?,
    ));

    let cleanup = Arc::new(TokenCleanupService::new(
        tokens,
        TokenCleanupConfig::from(&config.cleanup),
    ));

    match Arc::clone(&cleanup).start_background_task() {
        Some(task) => {
            tokio::select! {
                result = task => {
                    result.context("token sweep task stopped unexpectedly")?;
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for shutdown signal")?;
                    info!("Shutdown signal received");
                }
            }
        }
        None => info!("Token sweeping is disabled; exiting"),
    }

    db.close().await;
    info!("Token sweeper stopped");
    Ok(())
}
