pub mod audit;
pub mod token;

pub use audit::{AuditLogRepository, InMemoryAuditLogRepository, NoOpAuditLogRepository};
pub use token::{InMemoryTokenRepository, RotationOutcome, TokenRepository};
