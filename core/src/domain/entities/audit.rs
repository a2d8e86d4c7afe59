//! Audit log entity for recording refresh-token security events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Event types for refresh-token auditing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    // Lifecycle events
    TokenIssued,
    TokenRotated,
    RotationRejected,

    // Security events
    ReuseDetected,
    FamilyRevoked,

    // Revocation events
    TokenRevoked,
    UserTokensRevoked,
    ExpiredTokensSwept,
}

impl AuditEventType {
    /// Convert to string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenIssued => "TOKEN_ISSUED",
            Self::TokenRotated => "TOKEN_ROTATED",
            Self::RotationRejected => "ROTATION_REJECTED",
            Self::ReuseDetected => "REUSE_DETECTED",
            Self::FamilyRevoked => "FAMILY_REVOKED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::UserTokensRevoked => "USER_TOKENS_REVOKED",
            Self::ExpiredTokensSwept => "EXPIRED_TOKENS_SWEPT",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TOKEN_ISSUED" => Some(Self::TokenIssued),
            "TOKEN_ROTATED" => Some(Self::TokenRotated),
            "ROTATION_REJECTED" => Some(Self::RotationRejected),
            "REUSE_DETECTED" => Some(Self::ReuseDetected),
            "FAMILY_REVOKED" => Some(Self::FamilyRevoked),
            "TOKEN_REVOKED" => Some(Self::TokenRevoked),
            "USER_TOKENS_REVOKED" => Some(Self::UserTokensRevoked),
            "EXPIRED_TOKENS_SWEPT" => Some(Self::ExpiredTokensSwept),
            _ => None,
        }
    }

    /// Whether operators should treat the event as an attack signal
    pub fn is_security_alert(&self) -> bool {
        matches!(self, Self::ReuseDetected)
    }
}

/// Outcome of the audited operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOutcome {
    Success,
    Failure,
}

impl AuditOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            _ => None,
        }
    }
}

/// Represents an audit log entry for a refresh-token event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLog {
    /// Unique identifier for the log entry
    pub id: Uuid,

    /// Type of token event
    pub event_type: AuditEventType,

    /// User the event concerns, when known
    pub user_id: Option<Uuid>,

    /// Token family the event concerns, when known
    pub family_id: Option<Uuid>,

    /// Token the event concerns, when known
    pub token_id: Option<Uuid>,

    /// Whether the operation succeeded
    pub outcome: AuditOutcome,

    /// Trigger or failure reason
    pub reason: Option<String>,

    /// Additional event data in JSON format
    pub event_data: Option<JsonValue>,

    /// Timestamp when the event occurred
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    /// Create a new audit log entry
    pub fn new(event_type: AuditEventType, outcome: AuditOutcome, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            user_id: None,
            family_id: None,
            token_id: None,
            outcome,
            reason: None,
            event_data: None,
            created_at,
        }
    }

    /// Add user context to the audit log
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Add token family context
    pub fn with_family(mut self, family_id: Uuid) -> Self {
        self.family_id = Some(family_id);
        self
    }

    /// Add token ID for token-related events
    pub fn with_token_id(mut self, token_id: Uuid) -> Self {
        self.token_id = Some(token_id);
        self
    }

    /// Add trigger or failure reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Add event data as JSON
    pub fn with_event_data(mut self, data: JsonValue) -> Self {
        self.event_data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == AuditOutcome::Success
    }
}
