//! Invite token value objects
//!
//! The raw bearer token is the only secret: it is shown to the issuing
//! owner exactly once and never persisted. Storage only ever sees its
//! one-way lookup hash and an authenticated-encryption ciphertext kept
//! solely so the owner can redisplay a still-valid link.
//!
//! [`InviteToken`] redacts itself in both `Display` and `Debug` so the
//! secret cannot leak through logs or error messages.

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Length of a raw token: 32 random bytes, URL-safe base64, no padding.
pub const TOKEN_LEN: usize = 43;

/// A raw invite bearer token (256 bits of entropy, URL-safe encoding)
#[derive(Clone, PartialEq, Eq)]
pub struct InviteToken(String);

impl InviteToken {
    /// Wraps a candidate string, applying [`InviteToken::validate_format`].
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        Self::validate_format(&raw)?;
        Ok(Self(raw))
    }

    /// Cheap structural check (length and character set), performed
    /// before any hashing or lookup so garbage input never costs a
    /// storage round-trip.
    pub fn validate_format(candidate: &str) -> Result<(), ValidationError> {
        if candidate.len() != TOKEN_LEN {
            return Err(ValidationError::MalformedToken);
        }
        if !candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(ValidationError::MalformedToken);
        }
        Ok(())
    }

    /// The raw secret. Callers must only surface this once, at issue time.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[redacted invite token]")
    }
}

impl std::fmt::Debug for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InviteToken([redacted])")
    }
}

/// One-way lookup hash of a token (hex-encoded fixed-output digest)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenHash(String);

impl TokenHash {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authenticated-encryption ciphertext of a token (base64, nonce-prefixed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenCiphertext(String);

impl TokenCiphertext {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
