//! Current Invite use case
//!
//! Owner-only redisplay of the accord's still-valid invitation. The
//! stored ciphertext is decrypted for the owner and nobody else; any
//! decryption problem reads as "no active invite".

use crate::invitations::{InvitationLedger, InviteError};
use crate::registry::{ParticipantRegistry, RegistryError};
use accord_domain::{AccordId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors from invite lookup
#[derive(Error, Debug)]
pub enum CurrentInviteError {
    #[error(transparent)]
    Authorization(#[from] RegistryError),

    #[error(transparent)]
    Invite(#[from] InviteError),
}

impl CurrentInviteError {
    pub fn code(&self) -> &'static str {
        match self {
            CurrentInviteError::Authorization(RegistryError::NotOwner) => "not_owner",
            CurrentInviteError::Authorization(RegistryError::NotParticipant) => "not_participant",
            CurrentInviteError::Authorization(RegistryError::Store(_)) => "persistence_failure",
            CurrentInviteError::Invite(InviteError::Store(_)) => "persistence_failure",
            CurrentInviteError::Invite(_) => "invite_rejected",
        }
    }
}

/// Input for [`CurrentInviteUseCase`]
#[derive(Debug, Clone)]
pub struct CurrentInviteInput {
    pub accord_id: AccordId,
    pub caller: UserId,
}

/// Details of the current invite, if one is active
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentInviteOutput {
    pub token: String,
    pub invite_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Use case for redisplaying the current invite to the owner
pub struct CurrentInviteUseCase {
    ledger: Arc<InvitationLedger>,
    registry: Arc<ParticipantRegistry>,
    join_url_base: String,
}

impl CurrentInviteUseCase {
    pub fn new(
        ledger: Arc<InvitationLedger>,
        registry: Arc<ParticipantRegistry>,
        join_url_base: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            registry,
            join_url_base: join_url_base.into(),
        }
    }

    pub async fn execute(
        &self,
        input: CurrentInviteInput,
    ) -> Result<Option<CurrentInviteOutput>, CurrentInviteError> {
        self.registry
            .require_owner(input.accord_id, &input.caller)
            .await?;

        let Some(current) = self.ledger.current_invite(input.accord_id).await? else {
            return Ok(None);
        };
        let token = current.token.expose().to_string();
        Ok(Some(CurrentInviteOutput {
            invite_url: format!("{}/{}", self.join_url_base.trim_end_matches('/'), token),
            expires_at: current.expires_at,
            token,
        }))
    }
}
