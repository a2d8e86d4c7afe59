//! Domain entities representing refresh tokens and their audit trail.

pub mod audit;
pub mod token;


// Re-export commonly used types
pub use audit::{AuditEventType, AuditLog, AuditOutcome};
pub use token::{RefreshToken, RevocationReason, TokenState, REFRESH_TOKEN_EXPIRY_DAYS};
