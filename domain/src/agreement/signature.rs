//! Agreement signatures
//!
//! A [`Signature`] is an **attestation**, not an asymmetric-key digital
//! signature: its value is a one-way function of the participant id, the
//! signing timestamp, and the hash of the canonical snapshot. It proves
//! which content a participant affirmed and when, within this system's
//! records; it is not independently verifiable by third parties and must
//! not be presented as such.

use crate::core::ids::{AccordId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hex-encoded hash of a canonical snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotHash(String);

impl SnapshotHash {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One participant's attestation of one round's content (Entity)
///
/// At most one per (accord, participant, round); never mutated, only
/// superseded by a later round's signatures if the accord reopens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub accord_id: AccordId,
    pub participant_id: ParticipantId,
    pub round: u32,
    pub snapshot_hash: SnapshotHash,
    /// Derived attestation value, see module docs
    pub value: String,
    pub signed_at: DateTime<Utc>,
}

impl Signature {
    pub fn new(
        accord_id: AccordId,
        participant_id: ParticipantId,
        round: u32,
        snapshot_hash: SnapshotHash,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            accord_id,
            participant_id,
            round,
            snapshot_hash,
            value: value.into(),
            signed_at: now,
        }
    }
}
