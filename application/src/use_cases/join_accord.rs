//! Join Accord use case
//!
//! Redeems an invite token for partner membership. Redemption attempts
//! are throttled per requesting network origin before any token work
//! happens, to blunt brute-force guessing.

use crate::invitations::{InvitationLedger, InviteError};
use crate::ports::rate_limit::RateLimiter;
use accord_domain::{AccordId, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors from joining
#[derive(Error, Debug)]
pub enum JoinAccordError {
    #[error("too many join attempts, try again later")]
    RateLimited,

    #[error(transparent)]
    Invite(#[from] InviteError),
}

impl JoinAccordError {
    pub fn code(&self) -> &'static str {
        match self {
            JoinAccordError::RateLimited => "rate_limited",
            JoinAccordError::Invite(e) => match e {
                InviteError::NotFound => "invite_not_found",
                InviteError::Revoked => "invite_revoked",
                InviteError::Expired => "invite_expired",
                InviteError::UsageExceeded => "invite_usage_exceeded",
                InviteError::AlreadyParticipant => "already_participant",
                InviteError::Invalid(_) => "invalid_input",
                InviteError::AccordNotFound => "accord_not_found",
                InviteError::Crypto(_) => "crypto_failure",
                InviteError::Store(_) => "persistence_failure",
            },
        }
    }
}

/// Input for [`JoinAccordUseCase`]
#[derive(Debug, Clone)]
pub struct JoinAccordInput {
    /// The raw invite token presented by the caller
    pub token: String,
    pub caller: UserId,
    /// Requesting network origin, the rate-limit key
    pub origin: String,
}

/// Output of [`JoinAccordUseCase`]
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinAccordOutput {
    pub accord_id: AccordId,
}

/// Use case for redeeming an invitation
pub struct JoinAccordUseCase {
    ledger: Arc<InvitationLedger>,
    limiter: Arc<dyn RateLimiter>,
}

impl JoinAccordUseCase {
    pub fn new(ledger: Arc<InvitationLedger>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { ledger, limiter }
    }

    pub async fn execute(
        &self,
        input: JoinAccordInput,
    ) -> Result<JoinAccordOutput, JoinAccordError> {
        if !self.limiter.allow(&input.origin) {
            warn!(origin = %input.origin, "join attempt rate limited");
            return Err(JoinAccordError::RateLimited);
        }

        let accord_id = self.ledger.redeem(&input.token, &input.caller).await?;
        Ok(JoinAccordOutput { accord_id })
    }
}
