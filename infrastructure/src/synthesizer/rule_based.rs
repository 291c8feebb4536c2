//! Rule-based local synthesizer
//!
//! Deterministic field-by-field comparison of answer objects. Each key
//! every participant answered is compared: equal values (strings
//! compared trimmed, case-insensitive) align, differing values
//! conflict. Keys some participants skipped become gaps. The alignment
//! score is the aligned share of fully-answered topics.
//!
//! This adapter keeps the whole workflow exercisable without network
//! access; the CLI demo and the integration tests run against it.

use accord_application::{SynthesisError, Synthesizer};
use accord_domain::{
    AlignedItem, AlignmentReport, AlignmentRequest, AlignmentScore, Conflict, ConflictPosition,
    ConflictSeverity, ParticipantPosition, ResolutionAdvice, ResolutionOption, ResolutionRequest,
};
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::debug;

/// Deterministic [`Synthesizer`] with no external dependencies
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSynthesizer;

impl RuleBasedSynthesizer {
    pub fn new() -> Self {
        Self
    }

    fn normalize(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.trim().to_lowercase(),
            other => other.to_string(),
        }
    }

    fn severity(values: &[&serde_json::Value]) -> ConflictSeverity {
        let first_kind = kind(values[0]);
        if values.iter().any(|v| kind(v) != first_kind) {
            return ConflictSeverity::High;
        }
        let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
        if numbers.len() == values.len() {
            let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let base = min.abs().max(1.0);
            return if (max - min) / base > 0.5 {
                ConflictSeverity::High
            } else {
                ConflictSeverity::Low
            };
        }
        ConflictSeverity::Medium
    }

    fn display(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait]
impl Synthesizer for RuleBasedSynthesizer {
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError> {
        let positions: Vec<&ParticipantPosition> = request.positions.iter().collect();
        if positions.len() < 2 {
            return Err(SynthesisError::InvalidResult(
                "alignment needs at least two positions".to_string(),
            ));
        }

        // Sorted key union keeps the report order stable across runs
        let mut topics: BTreeSet<&str> = BTreeSet::new();
        for position in &positions {
            if let Some(map) = position.answers.as_object() {
                topics.extend(map.keys().map(String::as_str));
            }
        }

        let mut aligned = Vec::new();
        let mut conflicts = Vec::new();
        let mut gaps = Vec::new();
        let mut compared = 0usize;

        for topic in topics {
            let values: Vec<Option<&serde_json::Value>> = positions
                .iter()
                .map(|p| p.answers.as_object().and_then(|m| m.get(topic)))
                .collect();
            if values.iter().any(Option::is_none) {
                gaps.push(format!("not everyone answered '{topic}'"));
                continue;
            }
            let values: Vec<&serde_json::Value> = values.into_iter().flatten().collect();
            compared += 1;

            let first = Self::normalize(values[0]);
            if values.iter().all(|v| Self::normalize(v) == first) {
                aligned.push(AlignedItem {
                    topic: topic.to_string(),
                    summary: Self::display(values[0]),
                });
            } else {
                conflicts.push(Conflict {
                    topic: topic.to_string(),
                    severity: Self::severity(&values),
                    positions: positions
                        .iter()
                        .zip(&values)
                        .map(|(p, v)| ConflictPosition {
                            participant_id: p.participant_id,
                            position: Self::display(v),
                        })
                        .collect(),
                });
            }
        }

        let mut imbalances = Vec::new();
        let answer_counts: Vec<usize> = positions
            .iter()
            .map(|p| p.answers.as_object().map_or(0, |m| m.len()))
            .collect();
        if let (Some(&min), Some(&max)) =
            (answer_counts.iter().min(), answer_counts.iter().max())
        {
            if max >= min + 3 {
                imbalances.push(format!(
                    "answer detail is uneven: {min} vs {max} topics covered"
                ));
            }
        }

        let score_value = if compared == 0 {
            0
        } else {
            (aligned.len() * 100 / compared) as u8
        };
        let score = AlignmentScore::new(score_value)
            .map_err(|e| SynthesisError::InvalidResult(e.to_string()))?;

        debug!(
            accord = %request.accord_id,
            round = request.round,
            aligned = aligned.len(),
            conflicts = conflicts.len(),
            score = score_value,
            "rule-based analysis produced"
        );

        Ok(AlignmentReport {
            aligned,
            conflicts,
            assumptions: Vec::new(),
            gaps,
            imbalances,
            score,
        })
    }

    async fn suggest_resolutions(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        let topic = &request.conflict.topic;
        let stances: Vec<&str> = request
            .conflict
            .positions
            .iter()
            .map(|p| p.position.as_str())
            .collect();

        let options = vec![
            ResolutionOption {
                summary: format!("Meet in the middle on '{topic}'"),
                pros: vec!["both sides concede equally".to_string()],
                cons: vec!["neither side gets their preferred outcome".to_string()],
                next_steps: vec![format!(
                    "each participant names the part of their '{topic}' position they can drop"
                )],
            },
            ResolutionOption {
                summary: format!("Trial one position on '{topic}' with a review date"),
                pros: vec!["a concrete decision unblocks the rest".to_string()],
                cons: vec!["revisiting later costs another round".to_string()],
                next_steps: vec![
                    format!("pick one stated position on '{topic}' to trial"),
                    "agree on when to review it".to_string(),
                ],
            },
            ResolutionOption {
                summary: format!("Split '{topic}' into smaller decisions"),
                pros: vec!["partial agreement is captured instead of lost".to_string()],
                cons: vec!["more topics to track in the next round".to_string()],
                next_steps: vec![format!(
                    "list the independent sub-questions hiding inside '{topic}'"
                )],
            },
        ];

        Ok(ResolutionAdvice {
            options,
            implications: vec![format!(
                "'{topic}' currently has {} stated positions; the next round re-analyzes whatever is resubmitted",
                stances.len()
            )],
            examples: stances
                .iter()
                .take(2)
                .map(|s| format!("stated position: {s}"))
                .collect(),
        })
    }
}
