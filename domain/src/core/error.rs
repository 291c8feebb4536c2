//! Domain error types
//!
//! Two families: [`StateConflict`] for operations that are valid in general
//! but not in the accord's current phase or round, and [`ValidationError`]
//! for malformed input rejected before any storage round-trip.

use crate::workflow::phase::AccordPhase;
use thiserror::Error;

/// The operation conflicts with the accord's current phase or round.
///
/// Callers receiving one of these are expected to re-fetch current state
/// and decide; the server never retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateConflict {
    #[error("operation not allowed while accord is {phase}")]
    InvalidPhase { phase: AccordPhase },

    #[error("round mismatch: accord is on round {current}, caller named round {requested}")]
    RoundMismatch { current: u32, requested: u32 },

    #[error("response already submitted for round {round}")]
    AlreadySubmitted { round: u32 },

    #[error("already signed round {round}")]
    AlreadySigned { round: u32 },
}

impl StateConflict {
    /// Stable machine-readable code for the RPC surface.
    pub fn code(&self) -> &'static str {
        match self {
            StateConflict::InvalidPhase { .. } => "invalid_phase",
            StateConflict::RoundMismatch { .. } => "round_mismatch",
            StateConflict::AlreadySubmitted { .. } => "already_submitted",
            StateConflict::AlreadySigned { .. } => "already_signed",
        }
    }
}

/// Malformed input, rejected before any lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("answers payload must be a non-empty JSON object")]
    EmptyAnswers,

    #[error("malformed invite token")]
    MalformedToken,

    #[error("alignment score {0} is out of range (0-100)")]
    ScoreOutOfRange(u8),

    #[error("round numbers start at 1")]
    ZeroRound,
}
