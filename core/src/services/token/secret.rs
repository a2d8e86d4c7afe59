//! Opaque refresh secrets and their at-rest hash

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use session_shared::MIN_SECRET_BYTES;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::{DomainError, DomainResult};

/// Plaintext refresh secret handed to the client exactly once
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSecret(String);

impl RefreshSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshSecret(***)")
    }
}

/// Produces unguessable refresh secrets
pub trait SecretGenerator: Send + Sync {
    fn generate(&self) -> DomainResult<RefreshSecret>;
}

/// Secrets drawn from the operating system CSPRNG, base64url without padding
#[derive(Debug, Clone)]
pub struct OsSecretGenerator {
    bytes: usize,
}

impl OsSecretGenerator {
    pub fn new(bytes: usize) -> Self {
        Self { bytes }
    }
}

impl Default for OsSecretGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}

impl SecretGenerator for OsSecretGenerator {
    /// # Errors
    /// `DomainError::Internal` when configured below `MIN_SECRET_BYTES`
    /// or when the OS random source fails.
    fn generate(&self) -> DomainResult<RefreshSecret> {
        if self.bytes < MIN_SECRET_BYTES {
            return Err(DomainError::Internal {
                message: format!(
                    "refusing to generate a {}-byte secret; minimum is {}",
                    self.bytes, MIN_SECRET_BYTES
                ),
            });
        }

        let mut buf = vec![0u8; self.bytes];
        OsRng.try_fill_bytes(&mut buf).map_err(|e| DomainError::Internal {
            message: format!("OS random source failed: {}", e),
        })?;
        Ok(RefreshSecret(URL_SAFE_NO_PAD.encode(buf)))
    }
}

/// Lowercase hex SHA-256 of the secret; the only form ever persisted
pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}
