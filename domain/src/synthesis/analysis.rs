//! Alignment analysis value objects
//!
//! An [`Analysis`] is the per-round record of what the synthesizer found:
//! where participants agree, where they conflict (and how badly), what is
//! assumed, what is missing, and a numeric alignment score. Analyses are
//! created exclusively by the round coordinator after a satisfied round.

use crate::core::error::ValidationError;
use crate::core::ids::{AccordId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How sharply two positions diverge on a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

impl ConflictSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
        }
    }
}

/// One participant's stance inside a conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPosition {
    pub participant_id: ParticipantId,
    pub position: String,
}

/// A topic on which submitted answers disagree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub topic: String,
    pub severity: ConflictSeverity,
    pub positions: Vec<ConflictPosition>,
}

/// A topic on which submitted answers agree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedItem {
    pub topic: String,
    pub summary: String,
}

/// Overall alignment, 0 (total disagreement) to 100 (full agreement)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignmentScore(u8);

impl AlignmentScore {
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::ScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for AlignmentScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structured body of an analysis, as returned by the synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    #[serde(default)]
    pub aligned: Vec<AlignedItem>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub imbalances: Vec<String>,
    pub score: AlignmentScore,
}

impl AlignmentReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Per-round analysis record (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub accord_id: AccordId,
    pub round: u32,
    pub report: AlignmentReport,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    pub fn new(
        accord_id: AccordId,
        round: u32,
        report: AlignmentReport,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            accord_id,
            round,
            report,
            created_at: now,
        }
    }
}
