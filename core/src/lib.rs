//! # Session Guard Core
//!
//! Domain layer of the refresh-token rotation and reuse-detection engine.
//! This crate contains the token and audit entities, the repository
//! interfaces with in-memory implementations, the token services and the
//! error types shared by every layer above it.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AuditEventType, AuditLog, AuditOutcome, RefreshToken, RevocationReason, TokenState,
    REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use errors::{ClientError, DomainError, DomainResult, TokenError};
pub use repositories::{
    AuditLogRepository, InMemoryAuditLogRepository, InMemoryTokenRepository,
    NoOpAuditLogRepository, RotationOutcome, TokenRepository,
};
pub use services::{
    hash_secret, AuditService, AuditServiceConfig, CleanupResult, Clock, IssuedToken,
    ManualClock, OsSecretGenerator, RefreshSecret, RefreshTokenService, ReuseDetector,
    RevocationService, SecretGenerator, SystemClock, TokenCleanupConfig, TokenCleanupService,
    TokenContext, TokenIssuer, TokenRotator, TokenServiceConfig,
};
