//! Invitation records and their lifecycle rules

use crate::core::ids::{AccordId, InvitationId, UserId};
use crate::invite::token::{TokenCiphertext, TokenHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an invitation cannot be redeemed right now, or that it can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteUsability {
    Usable,
    /// Explicitly invalidated; permanent regardless of counters.
    Revoked,
    Expired,
    /// `current_uses` reached `max_uses`.
    Exhausted,
}

/// A single-use (by default), time-boxed invitation (Entity)
///
/// Only the token's one-way hash and its ciphertext are stored; the raw
/// token is never persisted. `current_uses <= max_uses` always; once
/// `invalidated_at` is set the invitation is permanently unusable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub accord_id: AccordId,
    pub token_hash: TokenHash,
    pub token_ciphertext: TokenCiphertext,
    pub created_by: UserId,
    pub expires_at: DateTime<Utc>,
    pub max_uses: u32,
    pub current_uses: u32,
    pub invalidated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        accord_id: AccordId,
        token_hash: TokenHash,
        token_ciphertext: TokenCiphertext,
        created_by: UserId,
        expires_at: DateTime<Utc>,
        max_uses: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            accord_id,
            token_hash,
            token_ciphertext,
            created_by,
            expires_at,
            max_uses,
            current_uses: 0,
            invalidated_at: None,
            created_at: now,
        }
    }

    /// Pure lifecycle check, evaluated in precedence order: revocation
    /// beats expiry beats exhaustion.
    pub fn usability_at(&self, now: DateTime<Utc>) -> InviteUsability {
        if self.invalidated_at.is_some() {
            return InviteUsability::Revoked;
        }
        if now > self.expires_at {
            return InviteUsability::Expired;
        }
        if self.current_uses >= self.max_uses {
            return InviteUsability::Exhausted;
        }
        InviteUsability::Usable
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.usability_at(now) == InviteUsability::Usable
    }
}
