//! Audit service module for recording token lifecycle and security events.

mod service;

pub use service::{AuditService, AuditServiceConfig};
