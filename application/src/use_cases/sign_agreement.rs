//! Sign Agreement use case
//!
//! Records the caller's attestation for the current round and reports
//! whether that reached quorum.

use crate::signatures::{SignatureError, SignatureLedger};
use accord_domain::{AccordId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors from signing
#[derive(Error, Debug)]
pub enum SignAgreementError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl SignAgreementError {
    pub fn code(&self) -> &'static str {
        match &self {
            SignAgreementError::Signature(e) => match e {
                SignatureError::AccordNotFound => "accord_not_found",
                SignatureError::NotParticipant => "not_participant",
                SignatureError::AnalysisMissing(_) => "analysis_missing",
                SignatureError::State(conflict) => conflict.code(),
                SignatureError::Attestation(_) => "attestation_failure",
                SignatureError::Store(_) => "persistence_failure",
            },
        }
    }
}

/// Input for [`SignAgreementUseCase`]
#[derive(Debug, Clone)]
pub struct SignAgreementInput {
    pub accord_id: AccordId,
    pub caller: UserId,
    pub round: u32,
}

/// Output of [`SignAgreementUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignAgreementOutput {
    pub all_signed: bool,
    /// The accord's phase after processing, as a stable string
    pub accord_status: String,
}

/// Use case for signing the agreement
pub struct SignAgreementUseCase {
    ledger: Arc<SignatureLedger>,
}

impl SignAgreementUseCase {
    pub fn new(ledger: Arc<SignatureLedger>) -> Self {
        Self { ledger }
    }

    pub async fn execute(
        &self,
        input: SignAgreementInput,
    ) -> Result<SignAgreementOutput, SignAgreementError> {
        let outcome = self
            .ledger
            .sign(input.accord_id, &input.caller, input.round)
            .await?;
        Ok(SignAgreementOutput {
            all_signed: outcome.all_signed,
            accord_status: outcome.phase.as_str().to_string(),
        })
    }
}
