//! Generate / Regenerate Invite use cases
//!
//! Owner-only. The raw token appears in the output exactly once; after
//! this response it exists nowhere in recoverable form except the
//! owner-redisplay ciphertext.

use crate::invitations::{InvitationLedger, InviteError};
use crate::registry::{ParticipantRegistry, RegistryError};
use accord_domain::{AccordId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Errors from invite generation
#[derive(Error, Debug)]
pub enum GenerateInviteError {
    #[error(transparent)]
    Authorization(#[from] RegistryError),

    #[error(transparent)]
    Invite(#[from] InviteError),
}

impl GenerateInviteError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerateInviteError::Authorization(RegistryError::NotOwner) => "not_owner",
            GenerateInviteError::Authorization(RegistryError::NotParticipant) => "not_participant",
            GenerateInviteError::Authorization(RegistryError::Store(_)) => "persistence_failure",
            GenerateInviteError::Invite(InviteError::AccordNotFound) => "accord_not_found",
            GenerateInviteError::Invite(InviteError::Crypto(_)) => "crypto_failure",
            GenerateInviteError::Invite(InviteError::Store(_)) => "persistence_failure",
            GenerateInviteError::Invite(_) => "invite_rejected",
        }
    }
}

/// Input for invite generation
#[derive(Debug, Clone)]
pub struct GenerateInviteInput {
    pub accord_id: AccordId,
    pub caller: UserId,
}

/// Output of invite generation. `token` is the one-time disclosure of
/// the raw secret.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInviteOutput {
    pub token: String,
    pub invite_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Use case for generating a fresh invite
pub struct GenerateInviteUseCase {
    ledger: Arc<InvitationLedger>,
    registry: Arc<ParticipantRegistry>,
    join_url_base: String,
}

impl GenerateInviteUseCase {
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
        input: GenerateInviteInput,
    ) -> Result<GenerateInviteOutput, GenerateInviteError> {
        self.registry
            .require_owner(input.accord_id, &input.caller)
            .await?;
        let issued = self.ledger.issue(input.accord_id, &input.caller).await?;
        Ok(render(issued, &self.join_url_base))
    }
}

/// Use case for superseding the current invite with a fresh one
pub struct RegenerateInviteUseCase {
    ledger: Arc<InvitationLedger>,
    registry: Arc<ParticipantRegistry>,
    join_url_base: String,
}

impl RegenerateInviteUseCase {
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
        input: GenerateInviteInput,
    ) -> Result<GenerateInviteOutput, GenerateInviteError> {
        self.registry
            .require_owner(input.accord_id, &input.caller)
            .await?;
        let issued = self
            .ledger
            .regenerate(input.accord_id, &input.caller)
            .await?;
        Ok(render(issued, &self.join_url_base))
    }
}

fn render(issued: crate::invitations::IssuedInvite, base: &str) -> GenerateInviteOutput {
    let token = issued.token.expose().to_string();
    GenerateInviteOutput {
        invite_url: format!("{}/{}", base.trim_end_matches('/'), token),
        expires_at: issued.invitation.expires_at,
        token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InvitePolicy;
    use crate::locks::AccordLocks;
    use crate::ports::clock::ManualClock;
    use crate::testing::{two_party_accord, MockStore, PlainCrypto};
    use accord_domain::AccordPhase;
    use chrono::Utc;

    struct Fixture {
        ledger: Arc<InvitationLedger>,
        generate: GenerateInviteUseCase,
        regenerate: RegenerateInviteUseCase,
        accord_id: AccordId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MockStore::new());
        let (accord_id, _, _) = two_party_accord(&store, AccordPhase::Active).await;
        let ledger = Arc::new(InvitationLedger::new(
            store.clone(),
            store.clone(),
            Arc::new(PlainCrypto),
            Arc::new(AccordLocks::new()),
            Arc::new(ManualClock::new(Utc::now())),
            InvitePolicy::default(),
        ));
        let registry = Arc::new(ParticipantRegistry::new(store));
        Fixture {
            generate: GenerateInviteUseCase::new(
                ledger.clone(),
                registry.clone(),
                "https://accord.example/join",
            ),
            regenerate: RegenerateInviteUseCase::new(
                ledger.clone(),
                registry,
                "https://accord.example/join",
            ),
            ledger,
            accord_id,
        }
    }

    #[tokio::test]
    async fn test_owner_generates_redeemable_invite() {
        let f = fixture().await;
        let out = f
            .generate
            .execute(GenerateInviteInput {
                accord_id: f.accord_id,
                caller: UserId::new("owner"),
            })
            .await
            .unwrap();
        assert_eq!(
            out.invite_url,
            format!("https://accord.example/join/{}", out.token)
        );

        let joined = f.ledger.redeem(&out.token, &UserId::new("third")).await.unwrap();
        assert_eq!(joined, f.accord_id);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_generate_or_regenerate() {
        let f = fixture().await;
        for caller in ["partner", "stranger"] {
            let expected = if caller == "partner" {
                "not_owner"
            } else {
                "not_participant"
            };
            let err = f
                .generate
                .execute(GenerateInviteInput {
                    accord_id: f.accord_id,
                    caller: UserId::new(caller),
                })
                .await
                .unwrap_err();
            assert_eq!(err.code(), expected);
            let err = f
                .regenerate
                .execute(GenerateInviteInput {
                    accord_id: f.accord_id,
                    caller: UserId::new(caller),
                })
                .await
                .unwrap_err();
            assert_eq!(err.code(), expected);
        }
    }

    #[tokio::test]
    async fn test_regenerate_rotates_token() {
        let f = fixture().await;
        let first = f
            .generate
            .execute(GenerateInviteInput {
                accord_id: f.accord_id,
                caller: UserId::new("owner"),
            })
            .await
            .unwrap();
        let second = f
            .regenerate
            .execute(GenerateInviteInput {
                accord_id: f.accord_id,
                caller: UserId::new("owner"),
            })
            .await
            .unwrap();
        assert_ne!(first.token, second.token);

        // The superseded token no longer admits anyone
        let err = f
            .ledger
            .redeem(&first.token, &UserId::new("third"))
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::Revoked));
        f.ledger
            .redeem(&second.token, &UserId::new("third"))
            .await
            .unwrap();
    }
}
