//! Participant registry
//!
//! Membership and role checks for one accord. The RPC boundary uses
//! `require_*` to authorize callers; the services use `find` to resolve
//! a user to their participant row.

use crate::ports::store::{retry_backend_once, StoreError, WorkflowStore};
use accord_domain::{AccordId, Participant, ParticipantId, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Errors from membership checks
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("caller is not a participant of this accord")]
    NotParticipant,

    #[error("caller is not the owner of this accord")]
    NotOwner,

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// Tracks who belongs to an accord and in what role
pub struct ParticipantRegistry {
    store: Arc<dyn WorkflowStore>,
}

impl ParticipantRegistry {
    pub fn new(store: Arc<dyn WorkflowStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, accord_id: AccordId) -> Result<Vec<Participant>, RegistryError> {
        Ok(retry_backend_once!(self.store.list_participants(accord_id).await)?)
    }

    /// Resolves a user to their participant row, if any.
    pub async fn find(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
    ) -> Result<Option<Participant>, RegistryError> {
        let participants = self.list(accord_id).await?;
        Ok(participants.into_iter().find(|p| &p.user_id == user_id))
    }

    /// Authorization check: the caller must be a participant.
    pub async fn require_participant(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
    ) -> Result<Participant, RegistryError> {
        self.find(accord_id, user_id)
            .await?
            .ok_or(RegistryError::NotParticipant)
    }

    /// Authorization check: the caller must be the owner.
    pub async fn require_owner(
        &self,
        accord_id: AccordId,
        user_id: &UserId,
    ) -> Result<Participant, RegistryError> {
        let participant = self.require_participant(accord_id, user_id).await?;
        if !participant.is_owner() {
            return Err(RegistryError::NotOwner);
        }
        Ok(participant)
    }

    /// Removes a participant row. Signatures they left behind stop
    /// counting toward quorum because quorum is always computed against
    /// the current participant set.
    pub async fn remove(
        &self,
        accord_id: AccordId,
        participant_id: ParticipantId,
    ) -> Result<(), RegistryError> {
        Ok(self
            .store
            .remove_participant(accord_id, participant_id)
            .await?)
    }
}
