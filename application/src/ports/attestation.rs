//! Attestation crypto port
//!
//! Agreement "signatures" in accord are hash-derived attestations: a
//! deterministic one-way function of (participant id, timestamp,
//! snapshot hash). They are not asymmetric-key signatures and carry no
//! independent verifiability; do not over-build verification on top of
//! them, and do not present them to users as more than they are.

use accord_domain::{CanonicalSnapshot, ParticipantId, SnapshotHash};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from snapshot hashing
#[derive(Error, Debug)]
pub enum AttestationError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

/// Crypto operations for agreement attestations
pub trait AttestationCrypto: Send + Sync {
    /// Fixed-output content hash of the canonical snapshot bytes.
    fn snapshot_hash(&self, snapshot: &CanonicalSnapshot) -> Result<SnapshotHash, AttestationError>;

    /// Derives the attestation value binding participant, time, and
    /// content. Deterministic for identical inputs.
    fn attestation_value(
        &self,
        participant_id: ParticipantId,
        signed_at: DateTime<Utc>,
        snapshot_hash: &SnapshotHash,
    ) -> String;
}
