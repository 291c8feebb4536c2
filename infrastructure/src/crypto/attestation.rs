//! Hash-derived agreement attestations
//!
//! The attestation value is SHA-256 over a fixed domain tag, the
//! participant row id, the signing timestamp, and the snapshot hash.
//! It binds who, when, and what within this system's records; it is
//! not an asymmetric-key signature and offers no independent
//! third-party verifiability.

use super::hex_encode;
use accord_application::{AttestationCrypto, AttestationError};
use accord_domain::{CanonicalSnapshot, ParticipantId, SnapshotHash};
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

const DOMAIN_TAG: &[u8] = b"accord agreement-attestation v1";

/// [`AttestationCrypto`] backed by SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct HashAttestation;

impl AttestationCrypto for HashAttestation {
    fn snapshot_hash(&self, snapshot: &CanonicalSnapshot) -> Result<SnapshotHash, AttestationError> {
        let bytes = snapshot
            .canonical_bytes()
            .map_err(|e| AttestationError::Serialization(e.to_string()))?;
        Ok(SnapshotHash::new(hex_encode(&Sha256::digest(bytes))))
    }

    fn attestation_value(
        &self,
        participant_id: ParticipantId,
        signed_at: DateTime<Utc>,
        snapshot_hash: &SnapshotHash,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update(participant_id.as_uuid().as_bytes());
        hasher.update(signed_at.to_rfc3339_opts(SecondsFormat::Micros, true).as_bytes());
        hasher.update(snapshot_hash.as_str().as_bytes());
        hex_encode(&hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_domain::{AnalysisDigest, SnapshotAnswer};
    use serde_json::json;

    fn snapshot() -> CanonicalSnapshot {
        CanonicalSnapshot::new(
            1,
            vec![SnapshotAnswer {
                participant_id: ParticipantId::new(),
                answers: json!({"budget": "$500"}),
            }],
            AnalysisDigest {
                score: 90,
                conflict_count: 0,
                aligned_topics: vec!["budget".to_string()],
            },
        )
    }

    #[test]
    fn test_snapshot_hash_is_stable_for_same_content() {
        let crypto = HashAttestation;
        let snapshot = snapshot();
        assert_eq!(
            crypto.snapshot_hash(&snapshot).unwrap(),
            crypto.snapshot_hash(&snapshot).unwrap()
        );
    }

    #[test]
    fn test_attestation_value_binds_all_inputs() {
        let crypto = HashAttestation;
        let hash = crypto.snapshot_hash(&snapshot()).unwrap();
        let now = Utc::now();
        let a = ParticipantId::new();
        let b = ParticipantId::new();

        let base = crypto.attestation_value(a, now, &hash);
        assert_eq!(base, crypto.attestation_value(a, now, &hash));
        assert_ne!(base, crypto.attestation_value(b, now, &hash));
        assert_ne!(
            base,
            crypto.attestation_value(a, now + chrono::Duration::seconds(1), &hash)
        );
        assert_ne!(
            base,
            crypto.attestation_value(a, now, &SnapshotHash::new("00".repeat(32)))
        );
    }
}
