//! Resolution advice value objects
//!
//! The synthesizer's compromise contract: for one conflict it returns
//! three to four options, each with a summary, trade-offs, and next
//! steps. Fewer than [`ResolutionAdvice::MIN_OPTIONS`] options is a
//! synthesis failure to be retried, never a result to persist.

use crate::core::ids::AccordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One proposed way to resolve a conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionOption {
    pub summary: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// The synthesizer's answer for one conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionAdvice {
    pub options: Vec<ResolutionOption>,
    #[serde(default)]
    pub implications: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl ResolutionAdvice {
    /// Below this option count the advice is treated as a failed
    /// synthesis, not a valid result.
    pub const MIN_OPTIONS: usize = 3;

    pub fn is_valid(&self) -> bool {
        self.options.len() >= Self::MIN_OPTIONS
    }
}

/// Persisted advice for one (accord, round, conflict) triple (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub accord_id: AccordId,
    pub round: u32,
    /// Index of the conflict inside the round's analysis
    pub conflict_index: usize,
    pub advice: ResolutionAdvice,
    pub created_at: DateTime<Utc>,
}

impl AdviceRecord {
    pub fn new(
        accord_id: AccordId,
        round: u32,
        conflict_index: usize,
        advice: ResolutionAdvice,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            accord_id,
            round,
            conflict_index,
            advice,
            created_at: now,
        }
    }
}
