//! Participants and roles

use crate::core::ids::{AccordId, ParticipantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a participant within an accord
///
/// Exactly one `Owner` exists per accord; everyone else is a `Partner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Owner,
    Partner,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Owner => "owner",
            ParticipantRole::Partner => "partner",
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership of one user in one accord (Entity)
///
/// Responses and signatures reference this row's id rather than the user
/// id, so removing and re-adding a user yields a fresh participant whose
/// quorum obligations start over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub accord_id: AccordId,
    pub user_id: UserId,
    pub role: ParticipantRole,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn owner(accord_id: AccordId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self::new(accord_id, user_id, ParticipantRole::Owner, now)
    }

    pub fn partner(accord_id: AccordId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self::new(accord_id, user_id, ParticipantRole::Partner, now)
    }

    fn new(
        accord_id: AccordId,
        user_id: UserId,
        role: ParticipantRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ParticipantId::new(),
            accord_id,
            user_id,
            role,
            joined_at: now,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role == ParticipantRole::Owner
    }
}
