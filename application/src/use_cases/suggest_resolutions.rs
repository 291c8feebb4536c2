//! Suggest Resolutions use case
//!
//! Invokes the synthesizer's compromise contract for one conflict of
//! the current round's analysis. Advice with fewer than three options
//! is a synthesis failure: it is retried within the policy budget and
//! never persisted.

use crate::config::SynthesisPolicy;
use crate::ports::clock::Clock;
use crate::ports::store::{StoreError, WorkflowStore};
use crate::ports::synthesizer::{SynthesisError, Synthesizer};
use crate::registry::{ParticipantRegistry, RegistryError};
use accord_domain::{
    AccordId, AdviceRecord, ResolutionAdvice, ResolutionRequest, UserId,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from resolution suggestion
#[derive(Error, Debug)]
pub enum SuggestResolutionsError {
    #[error(transparent)]
    Authorization(#[from] RegistryError),

    #[error("round {0} has no analysis")]
    AnalysisMissing(u32),

    #[error("analysis has no conflict at index {0}")]
    NoSuchConflict(usize),

    /// Retryable: transport failure, timeout, or an under-filled
    /// options list from the synthesizer.
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl SuggestResolutionsError {
    pub fn code(&self) -> &'static str {
        match self {
            SuggestResolutionsError::Authorization(RegistryError::NotParticipant) => {
                "not_participant"
            }
            SuggestResolutionsError::Authorization(RegistryError::NotOwner) => "not_owner",
            SuggestResolutionsError::Authorization(RegistryError::Store(_)) => {
                "persistence_failure"
            }
            SuggestResolutionsError::AnalysisMissing(_) => "analysis_missing",
            SuggestResolutionsError::NoSuchConflict(_) => "invalid_input",
            SuggestResolutionsError::Synthesis(_) => "synthesis_unavailable",
            SuggestResolutionsError::Store(_) => "persistence_failure",
        }
    }
}

/// Input for [`SuggestResolutionsUseCase`]
#[derive(Debug, Clone)]
pub struct SuggestResolutionsInput {
    pub accord_id: AccordId,
    pub caller: UserId,
    pub round: u32,
    /// Which conflict of the round's analysis to advise on
    pub conflict_index: usize,
}

/// Output of [`SuggestResolutionsUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResolutionsOutput {
    pub advice: ResolutionAdvice,
}

/// Use case for fetching compromise options on one conflict
pub struct SuggestResolutionsUseCase {
    store: Arc<dyn WorkflowStore>,
    synthesizer: Arc<dyn Synthesizer>,
    registry: Arc<ParticipantRegistry>,
    clock: Arc<dyn Clock>,
    policy: SynthesisPolicy,
}

impl SuggestResolutionsUseCase {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        synthesizer: Arc<dyn Synthesizer>,
        registry: Arc<ParticipantRegistry>,
        clock: Arc<dyn Clock>,
        policy: SynthesisPolicy,
    ) -> Self {
        Self {
            store,
            synthesizer,
            registry,
            clock,
            policy,
        }
    }

    pub async fn execute(
        &self,
        input: SuggestResolutionsInput,
    ) -> Result<SuggestResolutionsOutput, SuggestResolutionsError> {
        self.registry
            .require_participant(input.accord_id, &input.caller)
            .await?;

        let accord = self.store.get_accord(input.accord_id).await?;
        let analysis = self
            .store
            .get_analysis(input.accord_id, input.round)
            .await?
            .ok_or(SuggestResolutionsError::AnalysisMissing(input.round))?;
        let conflict = analysis
            .report
            .conflicts
            .get(input.conflict_index)
            .cloned()
            .ok_or(SuggestResolutionsError::NoSuchConflict(input.conflict_index))?;

        let request = ResolutionRequest {
            accord_id: input.accord_id,
            round: input.round,
            topic: accord.title,
            conflict,
            constraints: Vec::new(),
        };

        let mut attempts = 0;
        let advice = loop {
            attempts += 1;
            match self.attempt(&request).await {
                Ok(advice) => break advice,
                Err(e) if attempts <= self.policy.retry_budget => {
                    warn!(accord = %input.accord_id, round = input.round, error = %e, "resolution synthesis failed, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.store
            .insert_advice(AdviceRecord::new(
                input.accord_id,
                input.round,
                input.conflict_index,
                advice.clone(),
                self.clock.now(),
            ))
            .await?;
        debug!(accord = %input.accord_id, round = input.round, conflict = input.conflict_index, options = advice.options.len(), "resolution advice stored");

        Ok(SuggestResolutionsOutput { advice })
    }

    async fn attempt(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        let advice = match tokio::time::timeout(
            self.policy.timeout,
            self.synthesizer.suggest_resolutions(request),
        )
        .await
        {
            Err(_) => return Err(SynthesisError::Timeout(self.policy.timeout)),
            Ok(result) => result?,
        };
        if advice.options.len() < self.policy.min_options {
            return Err(SynthesisError::InvalidResult(format!(
                "expected at least {} options, got {}",
                self.policy.min_options,
                advice.options.len()
            )));
        }
        Ok(advice)
    }
}
