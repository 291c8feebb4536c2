//! Shared wiring for integration tests: real adapters behind the
//! application services, the way the composition root assembles them.

#![allow(dead_code)]

use accord_application::{
    AccordLocks, AccordStatusUseCase, CreateAccordUseCase, CurrentInviteUseCase,
    GenerateInviteUseCase, InvitationLedger, InvitePolicy, JoinAccordUseCase, ManualClock,
    ParticipantRegistry, RateLimiter, RoundCoordinator, SignAgreementUseCase, SignatureLedger,
    SubmitResponseUseCase, SuggestResolutionsUseCase, SynthesisPolicy, Synthesizer, Unlimited,
};
use accord_infrastructure::{AeadTokenCrypto, HashAttestation, MemoryStore, RuleBasedSynthesizer};
use chrono::Utc;
use std::sync::Arc;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub locks: Arc<AccordLocks>,
    pub crypto: Arc<AeadTokenCrypto>,
    pub invitations: Arc<InvitationLedger>,
    pub coordinator: Arc<RoundCoordinator>,

    pub create: CreateAccordUseCase,
    pub submit: SubmitResponseUseCase,
    pub sign: SignAgreementUseCase,
    pub generate_invite: GenerateInviteUseCase,
    pub join: JoinAccordUseCase,
    pub current_invite: CurrentInviteUseCase,
    pub status: AccordStatusUseCase,
    pub suggest: SuggestResolutionsUseCase,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Arc::new(RuleBasedSynthesizer::new()), Arc::new(Unlimited))
    }

    pub fn with_synthesizer(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self::build(synthesizer, Arc::new(Unlimited))
    }

    pub fn with_limiter(limiter: Arc<dyn RateLimiter>) -> Self {
        Self::build(Arc::new(RuleBasedSynthesizer::new()), limiter)
    }

    pub fn build(synthesizer: Arc<dyn Synthesizer>, limiter: Arc<dyn RateLimiter>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let locks = Arc::new(AccordLocks::new());
        let crypto = Arc::new(AeadTokenCrypto::new(b"integration test key material"));
        let invite_policy = InvitePolicy::default();
        let synthesis_policy = SynthesisPolicy::default();

        let registry = Arc::new(ParticipantRegistry::new(store.clone()));
        let invitations = Arc::new(InvitationLedger::new(
            store.clone(),
            store.clone(),
            crypto.clone(),
            locks.clone(),
            clock.clone(),
            invite_policy.clone(),
        ));
        let coordinator = Arc::new(RoundCoordinator::new(
            store.clone(),
            synthesizer.clone(),
            locks.clone(),
            clock.clone(),
            synthesis_policy.clone(),
        ));
        let signatures = Arc::new(SignatureLedger::new(
            store.clone(),
            Arc::new(HashAttestation),
            locks.clone(),
            clock.clone(),
        ));

        Self {
            create: CreateAccordUseCase::new(store.clone(), clock.clone()),
            submit: SubmitResponseUseCase::new(coordinator.clone()),
            sign: SignAgreementUseCase::new(signatures),
            generate_invite: GenerateInviteUseCase::new(
                invitations.clone(),
                registry.clone(),
                invite_policy.join_url_base.clone(),
            ),
            join: JoinAccordUseCase::new(invitations.clone(), limiter),
            current_invite: CurrentInviteUseCase::new(
                invitations.clone(),
                registry.clone(),
                invite_policy.join_url_base.clone(),
            ),
            status: AccordStatusUseCase::new(store.clone(), registry.clone()),
            suggest: SuggestResolutionsUseCase::new(
                store.clone(),
                synthesizer,
                registry,
                clock.clone(),
                synthesis_policy,
            ),
            store,
            clock,
            locks,
            crypto,
            invitations,
            coordinator,
        }
    }
}
