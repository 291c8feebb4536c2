//! Storage ports
//!
//! Two ports: [`WorkflowStore`] for accords, participants, responses,
//! analyses, signatures, and advice; [`InvitationStore`] for invitation
//! records. Implementations must honor the conditional-update and
//! exclusive-insert semantics documented on each method — they are the
//! second enforcement layer under the per-accord lock.

use accord_domain::{
    Accord, AccordId, AccordPhase, AdviceRecord, Analysis, Invitation, InvitationId, Participant,
    ParticipantId, Response, Signature, TokenHash,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the storage ports
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness or exclusivity rule rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Backend failure. Callers retry the operation at most once before
    /// surfacing it.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Retries the wrapped store call once on a backend failure.
macro_rules! retry_backend_once {
    ($call:expr) => {
        match $call {
            Err($crate::ports::store::StoreError::Backend(reason)) => {
                tracing::warn!(%reason, "store call failed, retrying once");
                $call
            }
            other => other,
        }
    };
}
pub(crate) use retry_backend_once;

/// Store for workflow state
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn insert_accord(&self, accord: Accord) -> StoreResult<()>;

    async fn get_accord(&self, id: AccordId) -> StoreResult<Accord>;

    /// Conditional phase/round update. Applies `next` only when the
    /// stored (phase, round) equals `expected` and the transition is
    /// legal; returns whether the update was applied. Phase and round
    /// change together or not at all.
    async fn transition_accord(
        &self,
        id: AccordId,
        expected: (AccordPhase, u32),
        next: (AccordPhase, u32),
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Fails with [`StoreError::Conflict`] if the user already has a
    /// participant row on the accord.
    async fn insert_participant(&self, participant: Participant) -> StoreResult<()>;

    async fn list_participants(&self, accord_id: AccordId) -> StoreResult<Vec<Participant>>;

    async fn remove_participant(
        &self,
        accord_id: AccordId,
        participant_id: ParticipantId,
    ) -> StoreResult<()>;

    /// Exclusive insert: fails with [`StoreError::Conflict`] if a
    /// submitted response already exists for the same (accord,
    /// participant, round).
    async fn insert_response(&self, response: Response) -> StoreResult<()>;

    async fn list_submitted_responses(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<Vec<Response>>;

    /// One consistent read of the participant set and the submitted
    /// responses for `round`. The round-satisfaction gate is computed
    /// from this, never from two separate reads.
    async fn round_progress(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<(Vec<Participant>, Vec<Response>)>;

    /// Fails with [`StoreError::Conflict`] if an analysis already exists
    /// for the round.
    async fn insert_analysis(&self, analysis: Analysis) -> StoreResult<()>;

    async fn get_analysis(&self, accord_id: AccordId, round: u32) -> StoreResult<Option<Analysis>>;

    /// Exclusive insert: fails with [`StoreError::Conflict`] if the
    /// participant already signed the round.
    async fn insert_signature(&self, signature: Signature) -> StoreResult<()>;

    async fn list_signatures(&self, accord_id: AccordId, round: u32)
        -> StoreResult<Vec<Signature>>;

    async fn insert_advice(&self, record: AdviceRecord) -> StoreResult<()>;

    async fn list_advice(&self, accord_id: AccordId, round: u32) -> StoreResult<Vec<AdviceRecord>>;
}

/// Store for invitation records
#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn insert_invitation(&self, invitation: Invitation) -> StoreResult<()>;

    async fn get_invitation(&self, id: InvitationId) -> StoreResult<Invitation>;

    /// Lookup by one-way hash. Never by raw token.
    async fn find_by_hash(&self, hash: &TokenHash) -> StoreResult<Option<Invitation>>;

    async fn invalidate(&self, id: InvitationId, at: DateTime<Utc>) -> StoreResult<()>;

    /// Atomically increments `current_uses` if it is still below
    /// `max_uses`; returns whether a use was consumed. Two concurrent
    /// callers on a single-use invitation must see exactly one `true`.
    async fn consume_use(&self, id: InvitationId) -> StoreResult<bool>;

    /// Denormalized "current invite" pointer for the accord. A failed
    /// pointer update after a successful insert is logged by the caller
    /// and must not fail the primary operation.
    async fn set_current_invitation(
        &self,
        accord_id: AccordId,
        id: InvitationId,
    ) -> StoreResult<()>;

    async fn current_invitation(&self, accord_id: AccordId) -> StoreResult<Option<Invitation>>;
}
