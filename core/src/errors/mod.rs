//! Domain-specific error types and error handling.
//!
//! Token errors carry the internal classification used for audit logging.
//! Callers facing the network should map through [`DomainError::client_error`],
//! which folds unknown and replayed tokens into the same outward signal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Refresh-token validation failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Unknown or malformed token
    #[error("Invalid refresh token")]
    InvalidToken,

    /// Token lapsed naturally before it was presented
    #[error("Refresh token expired")]
    ExpiredToken,

    /// Replay of an already-rotated token; the whole family has been revoked
    #[error("Refresh token reuse detected")]
    ReuseDetected,
}

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Transient infrastructure fault (database error, timeout); retryable
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a storage fault
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Storage { .. })
    }

    /// The token classification, if this is a token error
    pub fn token_error(&self) -> Option<TokenError> {
        match self {
            DomainError::Token(e) => Some(*e),
            _ => None,
        }
    }

    /// Outward-facing classification for the transport layer
    pub fn client_error(&self) -> ClientError {
        match self {
            DomainError::Token(TokenError::InvalidToken)
            | DomainError::Token(TokenError::ReuseDetected) => ClientError::SessionInvalid,
            DomainError::Token(TokenError::ExpiredToken) => ClientError::SessionExpired,
            DomainError::Storage { .. } => ClientError::TemporarilyUnavailable,
            DomainError::Validation { .. }
            | DomainError::NotFound { .. }
            | DomainError::Internal { .. } => ClientError::Internal,
        }
    }
}

/// Error classes safe to expose to clients
///
/// `SessionInvalid` and `SessionExpired` both require a full login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientError {
    SessionInvalid,
    SessionExpired,
    TemporarilyUnavailable,
    Internal,
}

impl ClientError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::SessionInvalid => "SESSION_INVALID",
            ClientError::SessionExpired => "SESSION_EXPIRED",
            ClientError::TemporarilyUnavailable => "TEMPORARILY_UNAVAILABLE",
            ClientError::Internal => "INTERNAL_ERROR",
        }
    }

    /// Whether the client must re-authenticate from scratch
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::SessionInvalid | ClientError::SessionExpired)
    }

    /// Whether the client may retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::TemporarilyUnavailable)
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
