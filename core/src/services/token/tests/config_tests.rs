use session_shared::RefreshTokenConfig;
use std::time::Duration as StdDuration;

use crate::errors::DomainError;
use crate::services::token::TokenServiceConfig;

#[test]
fn test_conversion_keeps_configured_values() {
    let shared = RefreshTokenConfig {
        ttl_seconds: 3600,
        secret_bytes: 48,
        store_timeout_ms: 250,
    };

    let config = TokenServiceConfig::try_from(&shared).unwrap();
    assert_eq!(config.refresh_token_ttl, chrono::Duration::hours(1));
    assert_eq!(config.secret_bytes, 48);
    assert_eq!(config.store_timeout, StdDuration::from_millis(250));
    assert!(config.validate().is_ok());
}

#[test]
fn test_conversion_rejects_empty_secret() {
    let shared = RefreshTokenConfig {
        secret_bytes: 0,
        ..RefreshTokenConfig::default()
    };

    let result = TokenServiceConfig::try_from(&shared);
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[test]
fn test_conversion_rejects_non_positive_ttl_and_timeout() {
    let zero_ttl = RefreshTokenConfig {
        ttl_seconds: 0,
        ..RefreshTokenConfig::default()
    };
    assert!(TokenServiceConfig::try_from(&zero_ttl).is_err());

    let zero_timeout = RefreshTokenConfig {
        store_timeout_ms: 0,
        ..RefreshTokenConfig::default()
    };
    assert!(TokenServiceConfig::try_from(&zero_timeout).is_err());
}

#[test]
fn test_direct_config_validation() {
    assert!(TokenServiceConfig::default().validate().is_ok());

    let config = TokenServiceConfig {
        secret_bytes: 8,
        ..TokenServiceConfig::default()
    };
    assert!(matches!(config.validate(), Err(DomainError::Validation { .. })));

    let config = TokenServiceConfig {
        store_timeout: StdDuration::ZERO,
        ..TokenServiceConfig::default()
    };
    assert!(config.validate().is_err());
}
