//! Invitation ledger
//!
//! Issues, invalidates, redeems, and regenerates invite tokens. Storage
//! only ever holds a token's one-way hash (for lookup) and its
//! authenticated ciphertext (for owner redisplay); the raw token exists
//! in memory at issue time and inside a redeeming request, nowhere else.

use crate::config::InvitePolicy;
use crate::locks::AccordLocks;
use crate::ports::clock::Clock;
use crate::ports::store::{retry_backend_once, InvitationStore, StoreError, WorkflowStore};
use crate::ports::token_crypto::{TokenCrypto, TokenCryptoError};
use accord_domain::{
    AccordId, AccordPhase, Invitation, InviteToken, InviteUsability, Participant, UserId,
    ValidationError,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from invitation operations
#[derive(Error, Debug)]
pub enum InviteError {
    #[error("accord not found")]
    AccordNotFound,

    #[error("no invitation matches that token")]
    NotFound,

    #[error("invitation has been revoked")]
    Revoked,

    #[error("invitation has expired")]
    Expired,

    #[error("invitation use limit reached")]
    UsageExceeded,

    #[error("user is already a participant of this accord")]
    AlreadyParticipant,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Crypto(#[from] TokenCryptoError),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

/// A freshly issued invitation with its raw token.
///
/// The token is surfaced to the creating owner exactly once, here.
pub struct IssuedInvite {
    pub token: InviteToken,
    pub invitation: Invitation,
}

/// A still-valid invitation recovered for owner redisplay
pub struct CurrentInvite {
    pub token: InviteToken,
    pub expires_at: DateTime<Utc>,
}

/// Persists invitation records and enforces their lifecycle
pub struct InvitationLedger {
    invitations: Arc<dyn InvitationStore>,
    workflow: Arc<dyn WorkflowStore>,
    crypto: Arc<dyn TokenCrypto>,
    locks: Arc<AccordLocks>,
    clock: Arc<dyn Clock>,
    policy: InvitePolicy,
}

impl InvitationLedger {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        workflow: Arc<dyn WorkflowStore>,
        crypto: Arc<dyn TokenCrypto>,
        locks: Arc<AccordLocks>,
        clock: Arc<dyn Clock>,
        policy: InvitePolicy,
    ) -> Self {
        Self {
            invitations,
            workflow,
            crypto,
            locks,
            clock,
            policy,
        }
    }

    /// Issues a fresh invitation and makes it the accord's current one.
    ///
    /// The current-invite pointer update is a denormalization; if it
    /// fails after the insert succeeded that is logged and swallowed,
    /// never surfaced.
    pub async fn issue(
        &self,
        accord_id: AccordId,
        creator: &UserId,
    ) -> Result<IssuedInvite, InviteError> {
        // Existence check; ownership is authorized at the boundary
        match retry_backend_once!(self.workflow.get_accord(accord_id).await) {
            Err(StoreError::NotFound(_)) => return Err(InviteError::AccordNotFound),
            other => other?,
        };

        let generated = self.crypto.generate();
        let ciphertext = self.crypto.encrypt(&generated.token, accord_id)?;
        let now = self.clock.now();
        let invitation = Invitation::new(
            accord_id,
            generated.hash,
            ciphertext,
            creator.clone(),
            now + self.policy.ttl,
            self.policy.max_uses,
            now,
        );

        self.invitations
            .insert_invitation(invitation.clone())
            .await?;
        if let Err(e) = self
            .invitations
            .set_current_invitation(accord_id, invitation.id)
            .await
        {
            warn!(accord = %accord_id, error = %e, "current-invite pointer update failed");
        }

        info!(accord = %accord_id, invitation = %invitation.id, expires_at = %invitation.expires_at, "invitation issued");
        Ok(IssuedInvite {
            token: generated.token,
            invitation,
        })
    }

    /// Permanently invalidates the accord's current invitation, if any.
    pub async fn invalidate_current(&self, accord_id: AccordId) -> Result<(), InviteError> {
        if let Some(current) = self.invitations.current_invitation(accord_id).await? {
            self.invitations
                .invalidate(current.id, self.clock.now())
                .await?;
            debug!(accord = %accord_id, invitation = %current.id, "invitation invalidated");
        }
        Ok(())
    }

    /// Invalidates the current invitation and issues a new one. The two
    /// tokens are cryptographically independent.
    pub async fn regenerate(
        &self,
        accord_id: AccordId,
        creator: &UserId,
    ) -> Result<IssuedInvite, InviteError> {
        self.invalidate_current(accord_id).await?;
        self.issue(accord_id, creator).await
    }

    /// Exchanges a valid bearer token for partner membership.
    ///
    /// The usage-counter increment and the participant insert run inside
    /// the accord's critical section, and the counter increment itself
    /// is atomic in the store: of two simultaneous redeemers of a
    /// single-use token, exactly one succeeds.
    pub async fn redeem(
        &self,
        candidate: &str,
        redeemer: &UserId,
    ) -> Result<AccordId, InviteError> {
        // Structural check before any hashing or lookup
        let token = InviteToken::new(candidate)?;
        let hash = self.crypto.lookup_hash(&token);
        let invitation = self
            .invitations
            .find_by_hash(&hash)
            .await?
            .ok_or(InviteError::NotFound)?;
        let accord_id = invitation.accord_id;

        let _guard = self.locks.acquire(accord_id).await;

        // Re-read inside the critical section for fresh counters
        let invitation = self.invitations.get_invitation(invitation.id).await?;
        match invitation.usability_at(self.clock.now()) {
            InviteUsability::Revoked => return Err(InviteError::Revoked),
            InviteUsability::Expired => return Err(InviteError::Expired),
            InviteUsability::Exhausted => return Err(InviteError::UsageExceeded),
            InviteUsability::Usable => {}
        }

        let participants =
            retry_backend_once!(self.workflow.list_participants(accord_id).await)?;
        if participants.iter().any(|p| &p.user_id == redeemer) {
            return Err(InviteError::AlreadyParticipant);
        }

        if !self.invitations.consume_use(invitation.id).await? {
            return Err(InviteError::UsageExceeded);
        }

        let now = self.clock.now();
        let partner = Participant::partner(accord_id, redeemer.clone(), now);
        match self.workflow.insert_participant(partner).await {
            Err(StoreError::Conflict(_)) => return Err(InviteError::AlreadyParticipant),
            other => other?,
        }

        // First partner activates a draft accord
        let accord = self.workflow.get_accord(accord_id).await?;
        if accord.phase == AccordPhase::Draft {
            let applied = self
                .workflow
                .transition_accord(
                    accord_id,
                    (AccordPhase::Draft, accord.current_round),
                    (AccordPhase::Active, accord.current_round),
                    now,
                )
                .await?;
            if !applied {
                warn!(accord = %accord_id, "draft->active transition was not applied");
            }
        }

        info!(accord = %accord_id, redeemer = %redeemer, "invitation redeemed");
        Ok(accord_id)
    }

    /// Recovers the accord's current invitation for redisplay to its
    /// owner. Any decryption problem is treated as "no active invite",
    /// never an error.
    pub async fn current_invite(
        &self,
        accord_id: AccordId,
    ) -> Result<Option<CurrentInvite>, InviteError> {
        let Some(invitation) = self.invitations.current_invitation(accord_id).await? else {
            return Ok(None);
        };
        if !invitation.is_usable_at(self.clock.now()) {
            return Ok(None);
        }
        match self.crypto.decrypt(&invitation.token_ciphertext, accord_id) {
            Ok(token) => Ok(Some(CurrentInvite {
                token,
                expires_at: invitation.expires_at,
            })),
            Err(_) => {
                warn!(accord = %accord_id, invitation = %invitation.id, "stored invite ciphertext did not decrypt");
                Ok(None)
            }
        }
    }
}
