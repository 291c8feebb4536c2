//! The accord entity

use crate::core::error::ValidationError;
use crate::core::ids::{AccordId, UserId};
use crate::workflow::phase::AccordPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decision-alignment workflow between participants (Entity)
///
/// Invariants: `current_round >= 1` always; the round number never
/// decreases; phase changes follow [`AccordPhase::can_transition_to`].
/// The phase/round pair is the single piece of mutable shared state with
/// a strict single-writer requirement, so both fields are only ever
/// changed together through [`Accord::apply_transition`] under whatever
/// serialization point the caller provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accord {
    pub id: AccordId,
    pub title: String,
    pub owner: UserId,
    pub phase: AccordPhase,
    pub current_round: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Accord {
    /// Creates a new accord in `Draft` with round 1.
    pub fn new(
        title: impl Into<String>,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self {
            id: AccordId::new(),
            title,
            owner,
            phase: AccordPhase::Draft,
            current_round: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a phase (and optionally round) transition in one step.
    ///
    /// Returns `false` without mutating when the transition is illegal or
    /// would decrease the round. Phase and round always move together so a
    /// half-applied transition is never observable on the entity.
    pub fn apply_transition(
        &mut self,
        next_phase: AccordPhase,
        next_round: u32,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.phase.can_transition_to(next_phase) {
            return false;
        }
        if next_round < self.current_round {
            return false;
        }
        self.phase = next_phase;
        self.current_round = next_round;
        self.updated_at = now;
        true
    }
}
