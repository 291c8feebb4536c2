//! Signature ledger
//!
//! Collects per-round attestations over a canonical snapshot of the
//! agreement content and completes the accord once every *current*
//! participant has signed the round. Quorum is always computed against
//! the participant set at signing time, never a cached count: a
//! participant removed after signing does not block completion, and one
//! added after others signed re-opens the quorum requirement.

use crate::locks::AccordLocks;
use crate::ports::attestation::{AttestationCrypto, AttestationError};
use crate::ports::clock::Clock;
use crate::ports::store::{retry_backend_once, StoreError, WorkflowStore};
use accord_domain::{
    Accord, AccordId, AccordPhase, AnalysisDigest, CanonicalSnapshot, Signature, SnapshotAnswer,
    StateConflict, UserId,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from signing operations
#[derive(Error, Debug)]
pub enum SignatureError {
    #[error("accord not found")]
    AccordNotFound,

    #[error("caller is not a participant of this accord")]
    NotParticipant,

    /// Signing requires the round's analysis; without it there is no
    /// canonical content to attest to.
    #[error("round {0} has no analysis to sign")]
    AnalysisMissing(u32),

    #[error(transparent)]
    State(#[from] StateConflict),

    #[error(transparent)]
    Attestation(#[from] AttestationError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Result of one signing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutcome {
    /// Whether every current participant has now signed the round.
    pub all_signed: bool,
    /// The accord's phase after processing.
    pub phase: AccordPhase,
}

/// Records attestations and detects signature quorum
pub struct SignatureLedger {
    store: Arc<dyn WorkflowStore>,
    attestation: Arc<dyn AttestationCrypto>,
    locks: Arc<AccordLocks>,
    clock: Arc<dyn Clock>,
}

impl SignatureLedger {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        attestation: Arc<dyn AttestationCrypto>,
        locks: Arc<AccordLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            attestation,
            locks,
            clock,
        }
    }

    /// Signs the current round for one participant.
    ///
    /// Allowed while `Resolving` (normal signing) and while `Complete`
    /// (a participant added later affirming the finished agreement).
    /// The attestation binds (participant, timestamp, snapshot hash);
    /// see [`AttestationCrypto`] for what that does and does not prove.
    pub async fn sign(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
        round: u32,
    ) -> Result<SignOutcome, SignatureError> {
        let _guard = self.locks.acquire(accord_id).await;

        let accord = self.load_accord(accord_id).await?;
        if !accord.phase.accepts_signatures() {
            return Err(StateConflict::InvalidPhase {
                phase: accord.phase,
            }
            .into());
        }
        if round != accord.current_round {
            return Err(StateConflict::RoundMismatch {
                current: accord.current_round,
                requested: round,
            }
            .into());
        }

        let participants = retry_backend_once!(self.store.list_participants(accord_id).await)?;
        let participant = participants
            .iter()
            .find(|p| &p.user_id == user_id)
            .ok_or(SignatureError::NotParticipant)?;

        let analysis = self
            .store
            .get_analysis(accord_id, round)
            .await?
            .ok_or(SignatureError::AnalysisMissing(round))?;
        let submitted =
            retry_backend_once!(self.store.list_submitted_responses(accord_id, round).await)?;
        let answers = submitted
            .into_iter()
            .map(|r| SnapshotAnswer {
                participant_id: r.participant_id,
                answers: r.answers,
            })
            .collect();
        let snapshot =
            CanonicalSnapshot::new(round, answers, AnalysisDigest::from_analysis(&analysis));
        let snapshot_hash = self.attestation.snapshot_hash(&snapshot)?;

        let signed_at = self.clock.now();
        let value = self
            .attestation
            .attestation_value(participant.id, signed_at, &snapshot_hash);
        let signature = Signature::new(
            accord_id,
            participant.id,
            round,
            snapshot_hash,
            value,
            signed_at,
        );
        match self.store.insert_signature(signature).await {
            Err(StoreError::Conflict(_)) => {
                return Err(StateConflict::AlreadySigned { round }.into());
            }
            other => other?,
        }
        debug!(accord = %accord_id, participant = %participant.id, round, "signature recorded");

        // Quorum against the *current* participant set
        let all_signed = self.check_quorum(accord_id, round).await?;
        let mut phase = accord.phase;
        if all_signed && accord.phase == AccordPhase::Resolving {
            let applied = self
                .store
                .transition_accord(
                    accord_id,
                    (AccordPhase::Resolving, round),
                    (AccordPhase::Complete, round),
                    signed_at,
                )
                .await?;
            if applied {
                phase = AccordPhase::Complete;
                info!(accord = %accord_id, round, "signature quorum reached, accord complete");
            }
        }

        Ok(SignOutcome { all_signed, phase })
    }

    /// Whether every current participant has a signature for `round`.
    /// Requires at least two participants, like round satisfaction.
    pub async fn check_quorum(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> Result<bool, SignatureError> {
        let participants = retry_backend_once!(self.store.list_participants(accord_id).await)?;
        let signatures =
            retry_backend_once!(self.store.list_signatures(accord_id, round).await)?;
        Ok(participants.len() >= 2
            && participants
                .iter()
                .all(|p| signatures.iter().any(|s| s.participant_id == p.id)))
    }

    async fn load_accord(&self, accord_id: AccordId) -> Result<Accord, SignatureError> {
        match retry_backend_once!(self.store.get_accord(accord_id).await) {
            Err(StoreError::NotFound(_)) => Err(SignatureError::AccordNotFound),
            other => Ok(other?),
        }
    }
}
