//! Integration tests for the refresh token service through its public API

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    use session_core::{
        AuditEventType, AuditLogRepository, AuditService, AuditServiceConfig, ClientError,
        InMemoryAuditLogRepository, InMemoryTokenRepository, ManualClock, OsSecretGenerator,
        RefreshTokenService, TokenError, TokenRepository, TokenServiceConfig,
    };
    use session_shared::RefreshTokenConfig;

    struct Fixture {
        repo: Arc<InMemoryTokenRepository>,
        audit_repo: Arc<InMemoryAuditLogRepository>,
        clock: Arc<ManualClock>,
        service: RefreshTokenService<InMemoryTokenRepository>,
    }

    fn fixture(config: TokenServiceConfig) -> Fixture {
        let repo = Arc::new(InMemoryTokenRepository::new());
        let audit_repo = Arc::new(InMemoryAuditLogRepository::new());
        let audit = Arc::new(AuditService::new(
            audit_repo.clone(),
            AuditServiceConfig { async_writes: false },
        ));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
        ));
        let generator = Arc::new(OsSecretGenerator::new(config.secret_bytes));
        let service = RefreshTokenService::with_components(
            repo.clone(),
            clock.clone(),
            generator,
            audit,
            config,
        );
        Fixture {
            repo,
            audit_repo,
            clock,
            service,
        }
    }

    #[tokio::test]
    async fn test_login_refresh_theft_and_relogin() {
        let f = fixture(TokenServiceConfig::default());
        let user_id = Uuid::new_v4();

        // Login
        let t1 = f.service.issue(user_id).await.unwrap();
        let f1 = t1.record.family_id;

        // Normal refresh
        f.clock.advance(Duration::minutes(30));
        let t2 = f.service.rotate(t1.secret.expose()).await.unwrap();
        assert_eq!(t2.record.family_id, f1);

        // Stolen T1 is replayed
        let err = f.service.rotate(t1.secret.expose()).await.unwrap_err();
        assert_eq!(err.token_error(), Some(TokenError::ReuseDetected));
        assert_eq!(err.client_error(), ClientError::SessionInvalid);
        assert!(err.client_error().requires_login());

        let family = f.repo.find_by_family(f1).await.unwrap();
        assert!(family.iter().all(|t| t.is_revoked));
        assert!(f.service.rotate(t2.secret.expose()).await.is_err());

        // Fresh login opens a new, independent family
        let t3 = f.service.issue(user_id).await.unwrap();
        assert_ne!(t3.record.family_id, f1);
        assert!(f.service.rotate(t3.secret.expose()).await.is_ok());

        let trail = f.audit_repo.find_by_family(f1, 50).await.unwrap();
        let kinds: Vec<AuditEventType> = trail.iter().map(|e| e.event_type).collect();
        assert!(kinds.contains(&AuditEventType::TokenIssued));
        assert!(kinds.contains(&AuditEventType::TokenRotated));
        assert!(kinds.contains(&AuditEventType::ReuseDetected));
    }

    #[tokio::test]
    async fn test_password_change_logs_out_every_device() {
        let f = fixture(TokenServiceConfig::default());
        let user_id = Uuid::new_v4();

        let devices: Vec<_> = {
            let mut issued = Vec::new();
            for _ in 0..3 {
                issued.push(f.service.issue(user_id).await.unwrap());
            }
            issued
        };
        assert_eq!(f.service.active_sessions(user_id).await.unwrap().len(), 3);

        assert_eq!(f.service.revoke_all_for_user(user_id).await.unwrap(), 3);

        for device in &devices {
            let err = f.service.validate(device.secret.expose()).await.unwrap_err();
            assert_eq!(err.client_error(), ClientError::SessionInvalid);
        }
        assert!(f.service.active_sessions(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let config =
            TokenServiceConfig::try_from(&RefreshTokenConfig::default().with_ttl_days(1)).unwrap();
        let f = fixture(config);
        let issued = f.service.issue(Uuid::new_v4()).await.unwrap();

        f.clock.advance(Duration::days(1));
        let err = f.service.rotate(issued.secret.expose()).await.unwrap_err();
        assert_eq!(err.client_error(), ClientError::SessionExpired);

        assert_eq!(f.service.sweep_expired().await.unwrap(), 1);
        let err = f.service.rotate(issued.secret.expose()).await.unwrap_err();
        assert_eq!(err.token_error(), Some(TokenError::ExpiredToken));
    }

    #[tokio::test]
    async fn test_outage_is_retryable_for_clients() {
        let f = fixture(TokenServiceConfig::default());
        let issued = f.service.issue(Uuid::new_v4()).await.unwrap();

        f.repo.set_unavailable(true);
        let err = f.service.rotate(issued.secret.expose()).await.unwrap_err();
        assert_eq!(err.client_error(), ClientError::TemporarilyUnavailable);
        assert!(err.client_error().is_retryable());

        f.repo.set_unavailable(false);
        assert!(f.service.rotate(issued.secret.expose()).await.is_ok());
    }
}
