//! Round-scoped responses and the round-satisfaction rule

use crate::core::error::ValidationError;
use crate::core::ids::{AccordId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant's answers for one round (Entity)
///
/// At most one response exists per (accord, participant, round). Once
/// `submitted_at` is set the payload is immutable; resubmission is a
/// state conflict, never an overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub accord_id: AccordId,
    pub participant_id: ParticipantId,
    pub round: u32,
    /// Opaque answer payload. Keys are topics, values are positions.
    pub answers: serde_json::Value,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Response {
    /// Creates a submitted response. The payload must be a non-empty
    /// JSON object (topic -> position).
    pub fn submitted(
        accord_id: AccordId,
        participant_id: ParticipantId,
        round: u32,
        answers: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if round == 0 {
            return Err(ValidationError::ZeroRound);
        }
        match answers.as_object() {
            Some(map) if !map.is_empty() => {}
            _ => return Err(ValidationError::EmptyAnswers),
        }
        Ok(Self {
            accord_id,
            participant_id,
            round,
            answers,
            submitted_at: Some(now),
        })
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

/// The single synchronization gate for round progress.
///
/// A round is satisfied iff every current participant has a submitted
/// response for it, and there are at least two participants — a lone
/// owner can never satisfy a round. Both counts must come from one
/// consistent read of the store.
pub fn round_satisfied(participant_count: usize, submitted_count: usize) -> bool {
    participant_count >= 2 && submitted_count == participant_count
}
