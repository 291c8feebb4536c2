//! Crypto adapters for invite tokens and agreement attestations

pub mod attestation;
pub mod token;

pub use attestation::HashAttestation;
pub use token::AeadTokenCrypto;

/// Lowercase hex encoding of a digest.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
    }
    out
}
