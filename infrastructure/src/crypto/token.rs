//! AEAD-backed invite token crypto
//!
//! Tokens are 32 bytes from the OS RNG in URL-safe base64. Storage sees
//! only the SHA-256 lookup hash and an AES-256-GCM ciphertext whose key
//! is derived from process key material via BLAKE3 with a fixed
//! derivation context, and whose associated data is the accord id — a
//! ciphertext lifted onto another accord's record will not decrypt.

use super::hex_encode;
use accord_application::{GeneratedToken, TokenCrypto, TokenCryptoError};
use accord_domain::{AccordId, InviteToken, TokenCiphertext, TokenHash};
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const KEY_CONTEXT: &str = "accord invite-token sealing v1";
const NONCE_LEN: usize = 12;

/// [`TokenCrypto`] backed by OS randomness, SHA-256, and AES-256-GCM
pub struct AeadTokenCrypto {
    cipher: Aes256Gcm,
}

impl AeadTokenCrypto {
    /// Derives the sealing key from caller-held key material.
    pub fn new(key_material: &[u8]) -> Self {
        let mut key_bytes = blake3::derive_key(KEY_CONTEXT, key_material);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        key_bytes.zeroize();
        Self { cipher }
    }

    /// A fresh random key, for processes without configured key material.
    /// Ciphertexts do not survive a restart; tokens and hashes do.
    pub fn ephemeral() -> Self {
        let mut material = [0u8; 32];
        OsRng.fill_bytes(&mut material);
        let crypto = Self::new(&material);
        material.zeroize();
        crypto
    }
}

impl TokenCrypto for AeadTokenCrypto {
    fn generate(&self) -> GeneratedToken {
        let mut raw = [0u8; 32];
        OsRng.fill_bytes(&mut raw);
        let encoded = URL_SAFE_NO_PAD.encode(raw);
        raw.zeroize();

        let token = InviteToken::new(encoded)
            .unwrap_or_else(|_| unreachable!("32 bytes encode to 43 url-safe chars"));
        let hash = self.lookup_hash(&token);
        GeneratedToken { token, hash }
    }

    fn lookup_hash(&self, token: &InviteToken) -> TokenHash {
        let digest = Sha256::digest(token.expose().as_bytes());
        TokenHash::new(hex_encode(&digest))
    }

    fn encrypt(
        &self,
        token: &InviteToken,
        accord_id: AccordId,
    ) -> Result<TokenCiphertext, TokenCryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: token.expose().as_bytes(),
                    aad: accord_id.as_uuid().as_bytes(),
                },
            )
            .map_err(|e| TokenCryptoError::Encrypt(e.to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + sealed.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&sealed);
        Ok(TokenCiphertext::new(STANDARD.encode(framed)))
    }

    fn decrypt(
        &self,
        ciphertext: &TokenCiphertext,
        accord_id: AccordId,
    ) -> Result<InviteToken, TokenCryptoError> {
        let framed = STANDARD
            .decode(ciphertext.as_str())
            .map_err(|_| TokenCryptoError::Decrypt)?;
        if framed.len() <= NONCE_LEN {
            return Err(TokenCryptoError::Decrypt);
        }
        let (nonce_bytes, sealed) = framed.split_at(NONCE_LEN);

        let mut plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: sealed,
                    aad: accord_id.as_uuid().as_bytes(),
                },
            )
            .map_err(|_| TokenCryptoError::Decrypt)?;

        let recovered = String::from_utf8(plaintext.clone());
        plaintext.zeroize();
        recovered
            .map_err(|_| TokenCryptoError::Decrypt)
            .and_then(|raw| InviteToken::new(raw).map_err(|_| TokenCryptoError::Decrypt))
    }
}
