//! Token crypto port
//!
//! Generates opaque bearer tokens, computes their one-way lookup hash,
//! and reversibly encrypts them under a process-wide key so the issuing
//! owner can redisplay a still-valid invite link. The raw token is the
//! only artifact ever shown to a caller; it is never persisted.

use accord_domain::{AccordId, InviteToken, TokenCiphertext, TokenHash};
use thiserror::Error;

/// Errors from token generation and sealing
#[derive(Error, Debug)]
pub enum TokenCryptoError {
    #[error("token encryption failed: {0}")]
    Encrypt(String),

    /// Deliberately carries no detail; callers treat it as "no active
    /// invite" rather than an exceptional condition.
    #[error("token decryption failed")]
    Decrypt,
}

/// A freshly generated token together with its lookup hash
pub struct GeneratedToken {
    pub token: InviteToken,
    pub hash: TokenHash,
}

/// Crypto operations for invite tokens
pub trait TokenCrypto: Send + Sync {
    /// Produces a token with at least 256 bits of entropy in URL-safe
    /// encoding, plus its one-way lookup hash.
    fn generate(&self) -> GeneratedToken;

    /// The one-way hash used for storage lookups.
    fn lookup_hash(&self, token: &InviteToken) -> TokenHash;

    /// Authenticated encryption of the token, bound to the accord it
    /// invites into.
    fn encrypt(&self, token: &InviteToken, accord_id: AccordId)
        -> Result<TokenCiphertext, TokenCryptoError>;

    /// Inverse of [`TokenCrypto::encrypt`]. Fails closed: any
    /// authentication or format problem is [`TokenCryptoError::Decrypt`].
    fn decrypt(
        &self,
        ciphertext: &TokenCiphertext,
        accord_id: AccordId,
    ) -> Result<InviteToken, TokenCryptoError>;
}
