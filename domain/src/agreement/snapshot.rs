//! Canonical agreement snapshots
//!
//! What a participant signs is a deterministic serialization of the
//! round's content: the round number, every submitted answer payload in
//! participant-id order, and a digest of the round's analysis. Two
//! processes building a snapshot from the same state must produce the
//! same bytes, so field order is fixed here and JSON object keys are
//! sorted by `serde_json`'s default `BTreeMap`-backed `Value`.

use crate::core::ids::ParticipantId;
use crate::synthesis::analysis::Analysis;
use serde::{Deserialize, Serialize};

/// One participant's submitted answers inside a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotAnswer {
    pub participant_id: ParticipantId,
    pub answers: serde_json::Value,
}

/// Condensed view of the round's analysis, bound into the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDigest {
    pub score: u8,
    pub conflict_count: usize,
    pub aligned_topics: Vec<String>,
}

impl AnalysisDigest {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let mut aligned_topics: Vec<String> = analysis
            .report
            .aligned
            .iter()
            .map(|item| item.topic.clone())
            .collect();
        aligned_topics.sort();
        Self {
            score: analysis.report.score.value(),
            conflict_count: analysis.report.conflicts.len(),
            aligned_topics,
        }
    }
}

/// The canonical content a signature attests to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalSnapshot {
    pub round: u32,
    /// Submitted answers, ordered by participant id
    pub answers: Vec<SnapshotAnswer>,
    pub analysis: AnalysisDigest,
}

impl CanonicalSnapshot {
    /// Builds a snapshot, sorting answers into canonical order.
    pub fn new(round: u32, mut answers: Vec<SnapshotAnswer>, analysis: AnalysisDigest) -> Self {
        answers.sort_by_key(|a| a.participant_id);
        Self {
            round,
            answers,
            analysis,
        }
    }

    /// Byte-stable serialization of the snapshot.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
