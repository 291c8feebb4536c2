//! Round coordinator
//!
//! The central state machine. Records round-scoped submissions, decides
//! when a round is satisfied, invokes the synthesizer, and advances the
//! accord's phase/round record.
//!
//! Concurrency contract: every mutation runs inside the accord's
//! critical section from [`AccordLocks`], and every phase/round write
//! goes through the store's conditional update. Two participants racing
//! for the last two open slots of a round converge to exactly one
//! synthesis invocation and one transition; the loser of a round
//! advance gets [`StateConflict::RoundMismatch`], never silent
//! reassignment into the new round.

use crate::config::SynthesisPolicy;
use crate::locks::AccordLocks;
use crate::ports::store::{retry_backend_once, StoreError, WorkflowStore};
use crate::ports::synthesizer::{SynthesisError, Synthesizer};
use crate::ports::clock::Clock;
use accord_domain::{
    round_satisfied, Accord, AccordId, AccordPhase, AlignmentRequest, Analysis, Participant,
    ParticipantPosition, Response, StateConflict, UserId, ValidationError,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from coordination operations
#[derive(Error, Debug)]
pub enum CoordinationError {
    #[error("accord not found")]
    AccordNotFound,

    #[error("caller is not a participant of this accord")]
    NotParticipant,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateConflict),

    /// Synthesis failed; the accord remains in `Analyzing` and the same
    /// triggering operation can be retried.
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Whether this submission satisfied the round (every participant
    /// has now submitted).
    pub all_submitted: bool,
    /// The accord's current round after processing.
    pub next_round: u32,
}

/// The round-based coordination state machine
pub struct RoundCoordinator {
    store: Arc<dyn WorkflowStore>,
    synthesizer: Arc<dyn Synthesizer>,
    locks: Arc<AccordLocks>,
    clock: Arc<dyn Clock>,
    policy: SynthesisPolicy,
}

impl RoundCoordinator {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        synthesizer: Arc<dyn Synthesizer>,
        locks: Arc<AccordLocks>,
        clock: Arc<dyn Clock>,
        policy: SynthesisPolicy,
    ) -> Self {
        Self {
            store,
            synthesizer,
            locks,
            clock,
            policy,
        }
    }

    /// Records one participant's answers for the round they believe is
    /// current, and advances the accord when that completes the round.
    ///
    /// In `Active`, answers land on `round` itself. In `Resolving`,
    /// resolution answers become round `round + 1`'s response set; when
    /// every participant has submitted, `{current_round + 1, Analyzing}`
    /// is applied as one atomic update and re-synthesis runs.
    ///
    /// In `Analyzing` the only accepted call is a retry by a participant
    /// who already submitted: if the round is satisfied and its analysis
    /// is still missing (a previous synthesis failed), synthesis is
    /// re-attempted.
    pub async fn submit_response(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
        round: u32,
        answers: serde_json::Value,
    ) -> Result<SubmissionOutcome, CoordinationError> {
        let _guard = self.locks.acquire(accord_id).await;

        let accord = self.load_accord(accord_id).await?;
        let participant = self.resolve_participant(accord_id, user_id).await?;

        if round != accord.current_round {
            return Err(StateConflict::RoundMismatch {
                current: accord.current_round,
                requested: round,
            }
            .into());
        }

        let target_round = match accord.phase {
            AccordPhase::Active => round,
            AccordPhase::Resolving => round + 1,
            AccordPhase::Analyzing => {
                return self.retry_pending_synthesis(&accord, &participant).await;
            }
            phase => return Err(StateConflict::InvalidPhase { phase }.into()),
        };

        let response = Response::submitted(
            accord_id,
            participant.id,
            target_round,
            answers,
            self.clock.now(),
        )?;
        match self.store.insert_response(response).await {
            Err(StoreError::Conflict(_)) => {
                return Err(StateConflict::AlreadySubmitted {
                    round: target_round,
                }
                .into());
            }
            other => other?,
        }
        debug!(accord = %accord_id, participant = %participant.id, round = target_round, "response recorded");

        let (participants, submitted) = retry_backend_once!(
            self.store.round_progress(accord_id, target_round).await
        )?;
        if !round_satisfied(participants.len(), submitted.len()) {
            return Ok(SubmissionOutcome {
                all_submitted: false,
                next_round: accord.current_round,
            });
        }

        match accord.phase {
            AccordPhase::Active => {
                self.transition(&accord, (AccordPhase::Analyzing, round)).await?;
                self.run_synthesis(&accord, round).await?;
                Ok(SubmissionOutcome {
                    all_submitted: true,
                    next_round: round,
                })
            }
            AccordPhase::Resolving => {
                // Round increment and phase change as one atomic update
                self.transition(&accord, (AccordPhase::Analyzing, round + 1)).await?;
                self.run_synthesis(&accord, round + 1).await?;
                Ok(SubmissionOutcome {
                    all_submitted: true,
                    next_round: round + 1,
                })
            }
            _ => unreachable!("phase checked above"),
        }
    }

    /// Whether every current participant has a submitted response for
    /// `round`. Computed from one consistent read of both sets.
    pub async fn is_round_satisfied(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> Result<bool, CoordinationError> {
        let (participants, submitted) =
            retry_backend_once!(self.store.round_progress(accord_id, round).await)?;
        Ok(round_satisfied(participants.len(), submitted.len()))
    }

    /// Retry path for a failed synthesis: the accord sits in
    /// `Analyzing`, responses are all in, but no analysis exists yet.
    async fn retry_pending_synthesis(
        &self,
        accord: &Accord,
        participant: &Participant,
    ) -> Result<SubmissionOutcome, CoordinationError> {
        let round = accord.current_round;
        let (participants, submitted) =
            retry_backend_once!(self.store.round_progress(accord.id, round).await)?;
        let caller_submitted = submitted.iter().any(|r| r.participant_id == participant.id);

        if !caller_submitted || !round_satisfied(participants.len(), submitted.len()) {
            return Err(StateConflict::InvalidPhase {
                phase: AccordPhase::Analyzing,
            }
            .into());
        }
        if self.store.get_analysis(accord.id, round).await?.is_some() {
            // Synthesis already landed; nothing left to retry
            return Err(StateConflict::AlreadySubmitted { round }.into());
        }

        info!(accord = %accord.id, round, "re-attempting failed synthesis");
        self.run_synthesis(accord, round).await?;
        Ok(SubmissionOutcome {
            all_submitted: true,
            next_round: round,
        })
    }

    /// Invokes the synthesizer for `round` with a bounded timeout,
    /// persists the analysis, and moves `Analyzing -> Resolving`.
    ///
    /// On timeout or failure nothing is written and the accord stays in
    /// `Analyzing`, so the caller can retry without re-collecting
    /// responses.
    async fn run_synthesis(&self, accord: &Accord, round: u32) -> Result<(), CoordinationError> {
        let submitted =
            retry_backend_once!(self.store.list_submitted_responses(accord.id, round).await)?;
        let positions = submitted
            .iter()
            .map(|r| ParticipantPosition {
                participant_id: r.participant_id,
                answers: r.answers.clone(),
            })
            .collect();
        let request = AlignmentRequest {
            accord_id: accord.id,
            round,
            topic: accord.title.clone(),
            positions,
            constraints: Vec::new(),
        };

        let report = match tokio::time::timeout(
            self.policy.timeout,
            self.synthesizer.analyze_alignment(&request),
        )
        .await
        {
            Err(_) => {
                warn!(accord = %accord.id, round, "synthesis timed out; accord stays analyzing");
                return Err(SynthesisError::Timeout(self.policy.timeout).into());
            }
            Ok(Err(e)) => {
                warn!(accord = %accord.id, round, error = %e, "synthesis failed; accord stays analyzing");
                return Err(e.into());
            }
            Ok(Ok(report)) => report,
        };

        let conflicts = report.conflicts.len();
        let score = report.score;
        let analysis = Analysis::new(accord.id, round, report, self.clock.now());
        match self.store.insert_analysis(analysis).await {
            // A competing retry got there first; the result stands.
            Err(StoreError::Conflict(_)) => {}
            other => other?,
        }

        let applied = self
            .store
            .transition_accord(
                accord.id,
                (AccordPhase::Analyzing, round),
                (AccordPhase::Resolving, round),
                self.clock.now(),
            )
            .await?;
        if !applied {
            warn!(accord = %accord.id, round, "analyzing->resolving transition was not applied");
        }

        info!(accord = %accord.id, round, conflicts, score = %score, "analysis stored, accord resolving");
        Ok(())
    }

    async fn transition(
        &self,
        accord: &Accord,
        next: (AccordPhase, u32),
    ) -> Result<(), CoordinationError> {
        let applied = self
            .store
            .transition_accord(
                accord.id,
                (accord.phase, accord.current_round),
                next,
                self.clock.now(),
            )
            .await?;
        if !applied {
            // Lost a race despite the lock: surface as a state conflict
            return Err(StateConflict::InvalidPhase {
                phase: accord.phase,
            }
            .into());
        }
        Ok(())
    }

    async fn load_accord(&self, accord_id: AccordId) -> Result<Accord, CoordinationError> {
        match retry_backend_once!(self.store.get_accord(accord_id).await) {
            Err(StoreError::NotFound(_)) => Err(CoordinationError::AccordNotFound),
            other => Ok(other?),
        }
    }

    async fn resolve_participant(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
    ) -> Result<Participant, CoordinationError> {
        let participants =
            retry_backend_once!(self.store.list_participants(accord_id).await)?;
        participants
            .into_iter()
            .find(|p| &p.user_id == user_id)
            .ok_or(CoordinationError::NotParticipant)
    }
}
