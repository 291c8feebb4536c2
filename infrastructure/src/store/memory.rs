//! In-memory store
//!
//! Backs both storage ports with RwLock'd tables. The conditional
//! update and exclusive-insert contracts are enforced here for real:
//! each such operation holds the write lock for its whole
//! check-and-write, so the store is a correct second enforcement layer
//! even if a caller skips the per-accord critical section.

use accord_application::{InvitationStore, StoreError, StoreResult, WorkflowStore};
use accord_domain::{
    Accord, AccordId, AccordPhase, AdviceRecord, Analysis, Invitation, InvitationId, Participant,
    ParticipantId, Response, Signature, TokenHash,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct WorkflowTables {
    accords: HashMap<AccordId, Accord>,
    participants: HashMap<AccordId, Vec<Participant>>,
    responses: HashMap<AccordId, Vec<Response>>,
    analyses: HashMap<AccordId, Vec<Analysis>>,
    signatures: HashMap<AccordId, Vec<Signature>>,
    advice: HashMap<AccordId, Vec<AdviceRecord>>,
}

#[derive(Default)]
struct InvitationTables {
    invitations: HashMap<InvitationId, Invitation>,
    by_hash: HashMap<TokenHash, InvitationId>,
    current: HashMap<AccordId, InvitationId>,
}

/// RwLock-backed implementation of both storage ports
#[derive(Default)]
pub struct MemoryStore {
    workflow: RwLock<WorkflowTables>,
    invitations: RwLock<InvitationTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_workflow(&self) -> std::sync::RwLockReadGuard<'_, WorkflowTables> {
        self.workflow.read().expect("workflow tables poisoned")
    }

    fn write_workflow(&self) -> std::sync::RwLockWriteGuard<'_, WorkflowTables> {
        self.workflow.write().expect("workflow tables poisoned")
    }

    fn read_invitations(&self) -> std::sync::RwLockReadGuard<'_, InvitationTables> {
        self.invitations.read().expect("invitation tables poisoned")
    }

    fn write_invitations(&self) -> std::sync::RwLockWriteGuard<'_, InvitationTables> {
        self.invitations.write().expect("invitation tables poisoned")
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn insert_accord(&self, accord: Accord) -> StoreResult<()> {
        let mut tables = self.write_workflow();
        if tables.accords.contains_key(&accord.id) {
            return Err(StoreError::Conflict("accord id already exists".into()));
        }
        tables.accords.insert(accord.id, accord);
        Ok(())
    }

    async fn get_accord(&self, id: AccordId) -> StoreResult<Accord> {
        self.read_workflow()
            .accords
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("accord"))
    }

    async fn transition_accord(
        &self,
        id: AccordId,
        expected: (AccordPhase, u32),
        next: (AccordPhase, u32),
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.write_workflow();
        let accord = tables
            .accords
            .get_mut(&id)
            .ok_or(StoreError::NotFound("accord"))?;
        if (accord.phase, accord.current_round) != expected {
            return Ok(false);
        }
        Ok(accord.apply_transition(next.0, next.1, now))
    }

    async fn insert_participant(&self, participant: Participant) -> StoreResult<()> {
        let mut tables = self.write_workflow();
        let rows = tables.participants.entry(participant.accord_id).or_default();
        if rows.iter().any(|p| p.user_id == participant.user_id) {
            return Err(StoreError::Conflict(
                "user already participates in this accord".into(),
            ));
        }
        rows.push(participant);
        Ok(())
    }

    async fn list_participants(&self, accord_id: AccordId) -> StoreResult<Vec<Participant>> {
        Ok(self
            .read_workflow()
            .participants
            .get(&accord_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_participant(
        &self,
        accord_id: AccordId,
        participant_id: ParticipantId,
    ) -> StoreResult<()> {
        if let Some(rows) = self.write_workflow().participants.get_mut(&accord_id) {
            rows.retain(|p| p.id != participant_id);
        }
        Ok(())
    }

    async fn insert_response(&self, response: Response) -> StoreResult<()> {
        let mut tables = self.write_workflow();
        let rows = tables.responses.entry(response.accord_id).or_default();
        if rows.iter().any(|r| {
            r.participant_id == response.participant_id
                && r.round == response.round
                && r.is_submitted()
        }) {
            return Err(StoreError::Conflict(
                "participant already submitted for this round".into(),
            ));
        }
        rows.push(response);
        Ok(())
    }

    async fn list_submitted_responses(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<Vec<Response>> {
        Ok(self
            .read_workflow()
            .responses
            .get(&accord_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.round == round && r.is_submitted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn round_progress(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<(Vec<Participant>, Vec<Response>)> {
        // Single read guard: one consistent view of both tables
        let tables = self.read_workflow();
        let participants = tables
            .participants
            .get(&accord_id)
            .cloned()
            .unwrap_or_default();
        let responses = tables
            .responses
            .get(&accord_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.round == round && r.is_submitted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok((participants, responses))
    }

    async fn insert_analysis(&self, analysis: Analysis) -> StoreResult<()> {
        let mut tables = self.write_workflow();
        let rows = tables.analyses.entry(analysis.accord_id).or_default();
        if rows.iter().any(|a| a.round == analysis.round) {
            return Err(StoreError::Conflict(
                "round already has an analysis".into(),
            ));
        }
        rows.push(analysis);
        Ok(())
    }

    async fn get_analysis(&self, accord_id: AccordId, round: u32) -> StoreResult<Option<Analysis>> {
        Ok(self
            .read_workflow()
            .analyses
            .get(&accord_id)
            .and_then(|rows| rows.iter().find(|a| a.round == round))
            .cloned())
    }

    async fn insert_signature(&self, signature: Signature) -> StoreResult<()> {
        let mut tables = self.write_workflow();
        let rows = tables.signatures.entry(signature.accord_id).or_default();
        if rows
            .iter()
            .any(|s| s.participant_id == signature.participant_id && s.round == signature.round)
        {
            return Err(StoreError::Conflict(
                "participant already signed this round".into(),
            ));
        }
        rows.push(signature);
        Ok(())
    }

    async fn list_signatures(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<Vec<Signature>> {
        Ok(self
            .read_workflow()
            .signatures
            .get(&accord_id)
            .map(|rows| rows.iter().filter(|s| s.round == round).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_advice(&self, record: AdviceRecord) -> StoreResult<()> {
        self.write_workflow()
            .advice
            .entry(record.accord_id)
            .or_default()
            .push(record);
        Ok(())
    }

    async fn list_advice(&self, accord_id: AccordId, round: u32) -> StoreResult<Vec<AdviceRecord>> {
        Ok(self
            .read_workflow()
            .advice
            .get(&accord_id)
            .map(|rows| rows.iter().filter(|a| a.round == round).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn insert_invitation(&self, invitation: Invitation) -> StoreResult<()> {
        let mut tables = self.write_invitations();
        if tables.by_hash.contains_key(&invitation.token_hash) {
            return Err(StoreError::Conflict("token hash collision".into()));
        }
        tables
            .by_hash
            .insert(invitation.token_hash.clone(), invitation.id);
        tables.invitations.insert(invitation.id, invitation);
        Ok(())
    }

    async fn get_invitation(&self, id: InvitationId) -> StoreResult<Invitation> {
        self.read_invitations()
            .invitations
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("invitation"))
    }

    async fn find_by_hash(&self, hash: &TokenHash) -> StoreResult<Option<Invitation>> {
        let tables = self.read_invitations();
        Ok(tables
            .by_hash
            .get(hash)
            .and_then(|id| tables.invitations.get(id))
            .cloned())
    }

    async fn invalidate(&self, id: InvitationId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.write_invitations();
        let invitation = tables
            .invitations
            .get_mut(&id)
            .ok_or(StoreError::NotFound("invitation"))?;
        // Idempotent: the first invalidation timestamp sticks
        invitation.invalidated_at.get_or_insert(at);
        Ok(())
    }

    async fn consume_use(&self, id: InvitationId) -> StoreResult<bool> {
        let mut tables = self.write_invitations();
        let invitation = tables
            .invitations
            .get_mut(&id)
            .ok_or(StoreError::NotFound("invitation"))?;
        if invitation.current_uses >= invitation.max_uses {
            return Ok(false);
        }
        invitation.current_uses += 1;
        Ok(true)
    }

    async fn set_current_invitation(
        &self,
        accord_id: AccordId,
        id: InvitationId,
    ) -> StoreResult<()> {
        self.write_invitations().current.insert(accord_id, id);
        Ok(())
    }

    async fn current_invitation(&self, accord_id: AccordId) -> StoreResult<Option<Invitation>> {
        let tables = self.read_invitations();
        Ok(tables
            .current
            .get(&accord_id)
            .and_then(|id| tables.invitations.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_domain::{TokenCiphertext, UserId};
    use serde_json::json;

    async fn seeded_accord(store: &MemoryStore) -> AccordId {
        let accord = Accord::new("t", UserId::new("owner"), Utc::now()).unwrap();
        let id = accord.id;
        store.insert_accord(accord).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_transition_is_conditional_on_expected_state() {
        let store = MemoryStore::new();
        let id = seeded_accord(&store).await;

        // Wrong expected round: rejected without mutation
        let applied = store
            .transition_accord(
                id,
                (AccordPhase::Draft, 2),
                (AccordPhase::Active, 2),
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(!applied);
        assert_eq!(store.get_accord(id).await.unwrap().phase, AccordPhase::Draft);

        let applied = store
            .transition_accord(
                id,
                (AccordPhase::Draft, 1),
                (AccordPhase::Active, 1),
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(applied);
        assert_eq!(store.get_accord(id).await.unwrap().phase, AccordPhase::Active);
    }

    #[tokio::test]
    async fn test_illegal_transition_rejected_even_when_expected_matches() {
        let store = MemoryStore::new();
        let id = seeded_accord(&store).await;

        let applied = store
            .transition_accord(
                id,
                (AccordPhase::Draft, 1),
                (AccordPhase::Complete, 1),
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_response_insert_is_exclusive_per_round() {
        let store = MemoryStore::new();
        let id = seeded_accord(&store).await;
        let participant = ParticipantId::new();

        let response =
            Response::submitted(id, participant, 1, json!({"a": 1}), Utc::now()).unwrap();
        store.insert_response(response.clone()).await.unwrap();
        assert!(matches!(
            store.insert_response(response).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_consume_use_stops_at_max() {
        let store = MemoryStore::new();
        let invitation = Invitation::new(
            AccordId::new(),
            TokenHash::new("ab".repeat(32)),
            TokenCiphertext::new("ct"),
            UserId::new("owner"),
            Utc::now() + chrono::Duration::days(30),
            1,
            Utc::now(),
        );
        let id = invitation.id;
        store.insert_invitation(invitation).await.unwrap();

        assert!(store.consume_use(id).await.unwrap());
        assert!(!store.consume_use(id).await.unwrap());
        assert_eq!(store.get_invitation(id).await.unwrap().current_uses, 1);
    }

    #[tokio::test]
    async fn test_find_by_hash_only() {
        let store = MemoryStore::new();
        let hash = TokenHash::new("cd".repeat(32));
        let invitation = Invitation::new(
            AccordId::new(),
            hash.clone(),
            TokenCiphertext::new("ct"),
            UserId::new("owner"),
            Utc::now() + chrono::Duration::days(30),
            1,
            Utc::now(),
        );
        store.insert_invitation(invitation.clone()).await.unwrap();

        let found = store.find_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(found.id, invitation.id);
        assert!(store
            .find_by_hash(&TokenHash::new("ef".repeat(32)))
            .await
            .unwrap()
            .is_none());
    }
}
