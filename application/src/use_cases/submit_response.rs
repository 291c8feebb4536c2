//! Submit Response use case
//!
//! Records one participant's answers (or conflict resolutions) for the
//! round they believe is current. The coordinator resolves the caller
//! to their participant row and handles phase routing, satisfaction,
//! and synthesis.

use crate::coordinator::{CoordinationError, RoundCoordinator};
use accord_domain::{AccordId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors from response submission
#[derive(Error, Debug)]
pub enum SubmitResponseError {
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
}

impl SubmitResponseError {
    pub fn code(&self) -> &'static str {
        match &self {
            SubmitResponseError::Coordination(e) => match e {
                CoordinationError::AccordNotFound => "accord_not_found",
                CoordinationError::NotParticipant => "not_participant",
                CoordinationError::Invalid(_) => "invalid_input",
                CoordinationError::State(conflict) => conflict.code(),
                CoordinationError::Synthesis(_) => "synthesis_unavailable",
                CoordinationError::Store(_) => "persistence_failure",
            },
        }
    }

    /// Whether re-issuing the identical request can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitResponseError::Coordination(CoordinationError::Synthesis(_))
        )
    }
}

/// Input for [`SubmitResponseUseCase`]
#[derive(Debug, Clone)]
pub struct SubmitResponseInput {
    pub accord_id: AccordId,
    pub caller: UserId,
    /// The round the caller believes is current
    pub round: u32,
    /// Opaque answers payload (topic -> position object)
    pub answers: serde_json::Value,
}

/// Output of [`SubmitResponseUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseOutput {
    /// Whether this submission satisfied the round
    pub both_submitted: bool,
    pub next_round: u32,
}

/// Use case for submitting answers and resolutions
pub struct SubmitResponseUseCase {
    coordinator: Arc<RoundCoordinator>,
}

impl SubmitResponseUseCase {
    pub fn new(coordinator: Arc<RoundCoordinator>) -> Self {
        Self { coordinator }
    }

    pub async fn execute(
        &self,
        input: SubmitResponseInput,
    ) -> Result<SubmitResponseOutput, SubmitResponseError> {
        let outcome = self
            .coordinator
            .submit_response(input.accord_id, &input.caller, input.round, input.answers)
            .await?;
        Ok(SubmitResponseOutput {
            both_submitted: outcome.all_submitted,
            next_round: outcome.next_round,
        })
    }
}
