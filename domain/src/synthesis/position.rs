//! Request shapes consumed by the synthesizer

use crate::core::ids::{AccordId, ParticipantId};
use crate::synthesis::analysis::Conflict;
use serde::{Deserialize, Serialize};

/// One participant's full answer payload, as handed to the synthesizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantPosition {
    pub participant_id: ParticipantId,
    pub answers: serde_json::Value,
}

/// Input for alignment analysis: every submitted payload of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentRequest {
    pub accord_id: AccordId,
    pub round: u32,
    /// The accord title, used as overall context
    pub topic: String,
    pub positions: Vec<ParticipantPosition>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Input for resolution advice on a single conflict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub accord_id: AccordId,
    pub round: u32,
    pub topic: String,
    pub conflict: Conflict,
    #[serde(default)]
    pub constraints: Vec<String>,
}
