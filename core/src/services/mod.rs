//! Business services containing the refresh token use cases.

pub mod audit;
pub mod clock;
pub mod token;

// Re-export commonly used types
pub use audit::{AuditService, AuditServiceConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use token::{
    hash_secret, CleanupResult, IssuedToken, OsSecretGenerator, RefreshSecret,
    RefreshTokenService, ReuseDetector, RevocationService, SecretGenerator, TokenCleanupConfig,
    TokenCleanupService, TokenContext, TokenIssuer, TokenRotator, TokenServiceConfig,
};
