//! Accord Status use case
//!
//! Read-only snapshot of an accord for any of its participants: phase,
//! round, membership, submission and signature progress, and the latest
//! analysis overview.

use crate::ports::store::{retry_backend_once, StoreError, WorkflowStore};
use crate::registry::{ParticipantRegistry, RegistryError};
use accord_domain::{AccordId, ParticipantRole, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors from status lookup
#[derive(Error, Debug)]
pub enum AccordStatusError {
    #[error(transparent)]
    Authorization(#[from] RegistryError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl AccordStatusError {
    pub fn code(&self) -> &'static str {
        match self {
            AccordStatusError::Authorization(RegistryError::NotParticipant) => "not_participant",
            AccordStatusError::Authorization(RegistryError::NotOwner) => "not_owner",
            AccordStatusError::Authorization(RegistryError::Store(_)) => "persistence_failure",
            AccordStatusError::Store(StoreError::NotFound(_)) => "accord_not_found",
            AccordStatusError::Store(_) => "persistence_failure",
        }
    }
}

/// Input for [`AccordStatusUseCase`]
#[derive(Debug, Clone)]
pub struct AccordStatusInput {
    pub accord_id: AccordId,
    pub caller: UserId,
}

/// One participant row in the status view
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub user_id: String,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
}

/// Condensed view of the latest analysis
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOverview {
    pub round: u32,
    pub score: u8,
    pub conflict_count: usize,
    pub aligned_count: usize,
}

/// Output of [`AccordStatusUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordStatusOutput {
    pub title: String,
    pub phase: String,
    pub round: u32,
    pub participants: Vec<ParticipantSummary>,
    pub submitted_count: usize,
    pub signed_count: usize,
    pub latest_analysis: Option<AnalysisOverview>,
}

/// Use case for inspecting an accord
pub struct AccordStatusUseCase {
    store: Arc<dyn WorkflowStore>,
    registry: Arc<ParticipantRegistry>,
}

impl AccordStatusUseCase {
    pub fn new(store: Arc<dyn WorkflowStore>, registry: Arc<ParticipantRegistry>) -> Self {
        Self { store, registry }
    }

    pub async fn execute(
        &self,
        input: AccordStatusInput,
    ) -> Result<AccordStatusOutput, AccordStatusError> {
        self.registry
            .require_participant(input.accord_id, &input.caller)
            .await?;

        let accord = retry_backend_once!(self.store.get_accord(input.accord_id).await)?;
        let round = accord.current_round;
        let participants = self.store.list_participants(input.accord_id).await?;
        let responses = self
            .store
            .list_submitted_responses(input.accord_id, round)
            .await?;
        let signatures = self.store.list_signatures(input.accord_id, round).await?;

        // The analysis shown is the one for the round currently under
        // review. During Resolving that is the round just analyzed, not
        // the round resolutions feed into.
        let latest_analysis = self
            .store
            .get_analysis(input.accord_id, round)
            .await?
            .map(|analysis| AnalysisOverview {
                round: analysis.round,
                score: analysis.report.score.value(),
                conflict_count: analysis.report.conflicts.len(),
                aligned_count: analysis.report.aligned.len(),
            });

        Ok(AccordStatusOutput {
            title: accord.title,
            phase: accord.phase.as_str().to_string(),
            round,
            participants: participants
                .into_iter()
                .map(|p| ParticipantSummary {
                    user_id: p.user_id.to_string(),
                    role: p.role,
                    joined_at: p.joined_at,
                })
                .collect(),
            submitted_count: responses.len(),
            signed_count: signatures.len(),
            latest_analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{two_party_accord, MockStore};
    use accord_domain::{
        AccordPhase, AlignmentReport, AlignmentScore, Analysis, Conflict, ConflictSeverity,
    };
    use chrono::Utc;

    #[tokio::test]
    async fn test_status_reports_phase_round_and_analysis() {
        let store = Arc::new(MockStore::new());
        let (id, _, _) = two_party_accord(&store, AccordPhase::Resolving).await;
        let report = AlignmentReport {
            aligned: vec![],
            conflicts: vec![Conflict {
                topic: "timing".to_string(),
                severity: ConflictSeverity::High,
                positions: vec![],
            }],
            assumptions: vec![],
            gaps: vec![],
            imbalances: vec![],
            score: AlignmentScore::new(55).unwrap(),
        };
        store
            .insert_analysis(Analysis::new(id, 1, report, Utc::now()))
            .await
            .unwrap();

        let use_case = AccordStatusUseCase::new(
            store.clone(),
            Arc::new(ParticipantRegistry::new(store)),
        );
        let status = use_case
            .execute(AccordStatusInput {
                accord_id: id,
                caller: UserId::new("partner"),
            })
            .await
            .unwrap();

        assert_eq!(status.phase, "resolving");
        assert_eq!(status.round, 1);
        assert_eq!(status.participants.len(), 2);
        let overview = status.latest_analysis.unwrap();
        assert_eq!(overview.score, 55);
        assert_eq!(overview.conflict_count, 1);
    }

    #[tokio::test]
    async fn test_non_participant_rejected() {
        let store = Arc::new(MockStore::new());
        let (id, _, _) = two_party_accord(&store, AccordPhase::Active).await;
        let use_case = AccordStatusUseCase::new(
            store.clone(),
            Arc::new(ParticipantRegistry::new(store)),
        );

        let err = use_case
            .execute(AccordStatusInput {
                accord_id: id,
                caller: UserId::new("stranger"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_participant");
    }
}
