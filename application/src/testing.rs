//! In-test doubles shared by the unit tests of this crate.

use crate::ports::store::{InvitationStore, StoreError, StoreResult, WorkflowStore};
use crate::ports::synthesizer::{SynthesisError, Synthesizer};
use crate::ports::token_crypto::{GeneratedToken, TokenCrypto, TokenCryptoError};
use accord_domain::{
    Accord, AccordId, AccordPhase, AdviceRecord, AlignedItem, AlignmentReport, AlignmentRequest,
    AlignmentScore, Analysis, Conflict, ConflictPosition, ConflictSeverity, Invitation,
    InvitationId, InviteToken, Participant, ParticipantId, ResolutionAdvice, ResolutionOption,
    ResolutionRequest, Response, Signature, TokenCiphertext, TokenHash, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    accords: HashMap<AccordId, Accord>,
    participants: Vec<Participant>,
    responses: Vec<Response>,
    analyses: Vec<Analysis>,
    signatures: Vec<Signature>,
    advice: Vec<AdviceRecord>,
    invitations: HashMap<InvitationId, Invitation>,
    current_invites: HashMap<AccordId, InvitationId>,
}

/// Plain in-memory store double. Uniqueness rules are enforced; tests
/// that need contended CAS behavior live in the infrastructure crate
/// against the real adapter.
#[derive(Default)]
pub struct MockStore {
    tables: Mutex<Tables>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("mock store poisoned")
    }
}

#[async_trait]
impl WorkflowStore for MockStore {
    async fn insert_accord(&self, accord: Accord) -> StoreResult<()> {
        self.lock().accords.insert(accord.id, accord);
        Ok(())
    }

    async fn get_accord(&self, id: AccordId) -> StoreResult<Accord> {
        self.lock()
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
        let mut tables = self.lock();
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
        let mut tables = self.lock();
        if tables
            .participants
            .iter()
            .any(|p| p.accord_id == participant.accord_id && p.user_id == participant.user_id)
        {
            return Err(StoreError::Conflict("participant exists".into()));
        }
        tables.participants.push(participant);
        Ok(())
    }

    async fn list_participants(&self, accord_id: AccordId) -> StoreResult<Vec<Participant>> {
        Ok(self
            .lock()
            .participants
            .iter()
            .filter(|p| p.accord_id == accord_id)
            .cloned()
            .collect())
    }

    async fn remove_participant(
        &self,
        accord_id: AccordId,
        participant_id: ParticipantId,
    ) -> StoreResult<()> {
        self.lock()
            .participants
            .retain(|p| !(p.accord_id == accord_id && p.id == participant_id));
        Ok(())
    }

    async fn insert_response(&self, response: Response) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.responses.iter().any(|r| {
            r.accord_id == response.accord_id
                && r.participant_id == response.participant_id
                && r.round == response.round
                && r.is_submitted()
        }) {
            return Err(StoreError::Conflict("response exists".into()));
        }
        tables.responses.push(response);
        Ok(())
    }

    async fn list_submitted_responses(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<Vec<Response>> {
        Ok(self
            .lock()
            .responses
            .iter()
            .filter(|r| r.accord_id == accord_id && r.round == round && r.is_submitted())
            .cloned()
            .collect())
    }

    async fn round_progress(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<(Vec<Participant>, Vec<Response>)> {
        let tables = self.lock();
        let participants = tables
            .participants
            .iter()
            .filter(|p| p.accord_id == accord_id)
            .cloned()
            .collect();
        let responses = tables
            .responses
            .iter()
            .filter(|r| r.accord_id == accord_id && r.round == round && r.is_submitted())
            .cloned()
            .collect();
        Ok((participants, responses))
    }

    async fn insert_analysis(&self, analysis: Analysis) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables
            .analyses
            .iter()
            .any(|a| a.accord_id == analysis.accord_id && a.round == analysis.round)
        {
            return Err(StoreError::Conflict("analysis exists".into()));
        }
        tables.analyses.push(analysis);
        Ok(())
    }

    async fn get_analysis(&self, accord_id: AccordId, round: u32) -> StoreResult<Option<Analysis>> {
        Ok(self
            .lock()
            .analyses
            .iter()
            .find(|a| a.accord_id == accord_id && a.round == round)
            .cloned())
    }

    async fn insert_signature(&self, signature: Signature) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.signatures.iter().any(|s| {
            s.accord_id == signature.accord_id
                && s.participant_id == signature.participant_id
                && s.round == signature.round
        }) {
            return Err(StoreError::Conflict("signature exists".into()));
        }
        tables.signatures.push(signature);
        Ok(())
    }

    async fn list_signatures(
        &self,
        accord_id: AccordId,
        round: u32,
    ) -> StoreResult<Vec<Signature>> {
        Ok(self
            .lock()
            .signatures
            .iter()
            .filter(|s| s.accord_id == accord_id && s.round == round)
            .cloned()
            .collect())
    }

    async fn insert_advice(&self, record: AdviceRecord) -> StoreResult<()> {
        self.lock().advice.push(record);
        Ok(())
    }

    async fn list_advice(&self, accord_id: AccordId, round: u32) -> StoreResult<Vec<AdviceRecord>> {
        Ok(self
            .lock()
            .advice
            .iter()
            .filter(|a| a.accord_id == accord_id && a.round == round)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InvitationStore for MockStore {
    async fn insert_invitation(&self, invitation: Invitation) -> StoreResult<()> {
        self.lock().invitations.insert(invitation.id, invitation);
        Ok(())
    }

    async fn get_invitation(&self, id: InvitationId) -> StoreResult<Invitation> {
        self.lock()
            .invitations
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("invitation"))
    }

    async fn find_by_hash(&self, hash: &TokenHash) -> StoreResult<Option<Invitation>> {
        Ok(self
            .lock()
            .invitations
            .values()
            .find(|i| &i.token_hash == hash)
            .cloned())
    }

    async fn invalidate(&self, id: InvitationId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.lock();
        let invitation = tables
            .invitations
            .get_mut(&id)
            .ok_or(StoreError::NotFound("invitation"))?;
        invitation.invalidated_at.get_or_insert(at);
        Ok(())
    }

    async fn consume_use(&self, id: InvitationId) -> StoreResult<bool> {
        let mut tables = self.lock();
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
        self.lock().current_invites.insert(accord_id, id);
        Ok(())
    }

    async fn current_invitation(&self, accord_id: AccordId) -> StoreResult<Option<Invitation>> {
        let tables = self.lock();
        Ok(tables
            .current_invites
            .get(&accord_id)
            .and_then(|id| tables.invitations.get(id))
            .cloned())
    }
}

/// Deterministic-enough crypto for ledger and use-case tests: hash is
/// the token reversed, ciphertext is the token itself.
pub struct PlainCrypto;

impl TokenCrypto for PlainCrypto {
    fn generate(&self) -> GeneratedToken {
        // Unique per call, format-valid
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let raw = format!("{:0>43}", format!("t{}", COUNTER.fetch_add(1, Ordering::SeqCst)));
        let token = InviteToken::new(raw).unwrap();
        let hash = self.lookup_hash(&token);
        GeneratedToken { token, hash }
    }

    fn lookup_hash(&self, token: &InviteToken) -> TokenHash {
        TokenHash::new(token.expose().chars().rev().collect::<String>())
    }

    fn encrypt(
        &self,
        token: &InviteToken,
        _accord_id: AccordId,
    ) -> Result<TokenCiphertext, TokenCryptoError> {
        Ok(TokenCiphertext::new(token.expose()))
    }

    fn decrypt(
        &self,
        ciphertext: &TokenCiphertext,
        _accord_id: AccordId,
    ) -> Result<InviteToken, TokenCryptoError> {
        InviteToken::new(ciphertext.as_str()).map_err(|_| TokenCryptoError::Decrypt)
    }
}

/// Seeds an accord with an "owner" and a "partner" user in `phase`.
pub async fn two_party_accord(
    store: &MockStore,
    phase: AccordPhase,
) -> (AccordId, ParticipantId, ParticipantId) {
    let now = Utc::now();
    let mut accord = Accord::new("Test accord", UserId::new("owner"), now).unwrap();
    accord.phase = phase;
    let id = accord.id;
    store.insert_accord(accord).await.unwrap();

    let owner = Participant::owner(id, UserId::new("owner"), now);
    let partner = Participant::partner(id, UserId::new("partner"), now);
    let (owner_id, partner_id) = (owner.id, partner.id);
    store.insert_participant(owner).await.unwrap();
    store.insert_participant(partner).await.unwrap();
    (id, owner_id, partner_id)
}

fn aligned_report(positions: &[accord_domain::ParticipantPosition]) -> AlignmentReport {
    let aligned = positions
        .first()
        .and_then(|p| p.answers.as_object())
        .map(|map| {
            map.keys()
                .map(|topic| AlignedItem {
                    topic: topic.clone(),
                    summary: "agreed".to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    AlignmentReport {
        aligned,
        conflicts: vec![],
        assumptions: vec![],
        gaps: vec![],
        imbalances: vec![],
        score: AlignmentScore::new(100).unwrap(),
    }
}

fn conflicted_report(positions: &[accord_domain::ParticipantPosition]) -> AlignmentReport {
    let conflict_positions = positions
        .iter()
        .map(|p| ConflictPosition {
            participant_id: p.participant_id,
            position: p.answers.to_string(),
        })
        .collect();
    AlignmentReport {
        aligned: vec![],
        conflicts: vec![Conflict {
            topic: "budget".to_string(),
            severity: ConflictSeverity::Medium,
            positions: conflict_positions,
        }],
        assumptions: vec![],
        gaps: vec![],
        imbalances: vec![],
        score: AlignmentScore::new(40).unwrap(),
    }
}

/// Synthesizer double with canned behavior and call counting.
pub struct StubSynthesizer {
    conflicted: bool,
    options: usize,
    analyze_calls: AtomicUsize,
    advice_calls: AtomicUsize,
}

impl StubSynthesizer {
    /// Reports zero conflicts.
    pub fn aligned() -> Self {
        Self {
            conflicted: false,
            options: 3,
            analyze_calls: AtomicUsize::new(0),
            advice_calls: AtomicUsize::new(0),
        }
    }

    /// Reports exactly one conflict.
    pub fn conflicted() -> Self {
        Self {
            conflicted: true,
            ..Self::aligned()
        }
    }

    /// Returns this many options from `suggest_resolutions`.
    pub fn with_options(mut self, options: usize) -> Self {
        self.options = options;
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn advice_calls(&self) -> usize {
        self.advice_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for StubSynthesizer {
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        Ok(if self.conflicted {
            conflicted_report(&request.positions)
        } else {
            aligned_report(&request.positions)
        })
    }

    async fn suggest_resolutions(
        &self,
        _request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        self.advice_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ResolutionAdvice {
            options: (0..self.options)
                .map(|i| ResolutionOption {
                    summary: format!("option {i}"),
                    pros: vec!["pro".to_string()],
                    cons: vec!["con".to_string()],
                    next_steps: vec!["step".to_string()],
                })
                .collect(),
            implications: vec![],
            examples: vec![],
        })
    }
}

/// Fails the first `n` analyze calls, then behaves like an aligned stub.
pub struct FailingSynthesizer {
    remaining_failures: AtomicUsize,
}

impl FailingSynthesizer {
    pub fn failures(n: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl Synthesizer for FailingSynthesizer {
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(SynthesisError::Transport("synthesizer unavailable".into()));
        }
        Ok(aligned_report(&request.positions))
    }

    async fn suggest_resolutions(
        &self,
        _request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        Err(SynthesisError::Transport("synthesizer unavailable".into()))
    }
}
