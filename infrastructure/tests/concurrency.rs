//! Race-condition properties under the real store and locks.

mod common;

use accord_application::{
    Clock, CreateAccordInput, GenerateInviteInput, JoinAccordInput, SynthesisError, Synthesizer,
    WorkflowStore,
};
use accord_domain::{
    Accord, AccordPhase, AlignmentReport, AlignmentRequest, Participant, ResolutionAdvice,
    ResolutionRequest, UserId,
};
use accord_infrastructure::RuleBasedSynthesizer;
use async_trait::async_trait;
use common::Harness;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts analyze invocations while delegating to the rule-based
/// synthesizer.
struct CountingSynthesizer {
    inner: RuleBasedSynthesizer,
    analyze_calls: AtomicUsize,
}

impl CountingSynthesizer {
    fn new() -> Self {
        Self {
            inner: RuleBasedSynthesizer::new(),
            analyze_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Synthesizer for CountingSynthesizer {
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.analyze_alignment(request).await
    }

    async fn suggest_resolutions(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        self.inner.suggest_resolutions(request).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_submitters_trigger_exactly_one_synthesis() {
    let synthesizer = Arc::new(CountingSynthesizer::new());
    let harness = Arc::new(Harness::with_synthesizer(synthesizer.clone()));

    // Four-party accord seeded directly in Active
    let mut accord = Accord::new("Team offsite", UserId::new("u0"), harness.clock.now()).unwrap();
    accord.phase = AccordPhase::Active;
    let accord_id = accord.id;
    harness.store.insert_accord(accord).await.unwrap();
    harness
        .store
        .insert_participant(Participant::owner(
            accord_id,
            UserId::new("u0"),
            harness.clock.now(),
        ))
        .await
        .unwrap();
    for i in 1..4 {
        harness
            .store
            .insert_participant(Participant::partner(
                accord_id,
                UserId::new(format!("u{i}")),
                harness.clock.now(),
            ))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..4 {
        let harness = Arc::clone(&harness);
        handles.push(tokio::spawn(async move {
            harness
                .coordinator
                .submit_response(
                    accord_id,
                    &UserId::new(format!("u{i}")),
                    1,
                    json!({"city": "Lisbon"}),
                )
                .await
        }));
    }

    let mut satisfied = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.all_submitted {
            satisfied += 1;
        }
    }

    // Exactly one submitter closed the round, exactly one synthesis ran
    assert_eq!(satisfied, 1);
    assert_eq!(synthesizer.analyze_calls.load(Ordering::SeqCst), 1);
    let accord = harness.store.get_accord(accord_id).await.unwrap();
    assert_eq!(accord.phase, AccordPhase::Resolving);
    assert_eq!(accord.current_round, 1);
    assert!(harness.store.get_analysis(accord_id, 1).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_use_token_admits_exactly_one_of_two_racers() {
    let harness = Arc::new(Harness::new());
    let created = harness
        .create
        .execute(CreateAccordInput {
            title: "Apartment hunt".to_string(),
            owner: UserId::new("owner"),
        })
        .await
        .unwrap();
    let invite = harness
        .generate_invite
        .execute(GenerateInviteInput {
            accord_id: created.accord_id,
            caller: UserId::new("owner"),
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for name in ["first", "second"] {
        let harness = Arc::clone(&harness);
        let token = invite.token.clone();
        handles.push(tokio::spawn(async move {
            harness
                .join
                .execute(JoinAccordInput {
                    token,
                    caller: UserId::new(name),
                    origin: format!("198.51.100.{}", name.len()),
                })
                .await
        }));
    }

    let results: Vec<_> = futures_join(handles).await;
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one racer must lose");
    assert_eq!(failure.code(), "invite_usage_exceeded");

    // Owner plus exactly one admitted partner
    let participants = harness
        .store
        .list_participants(created.accord_id)
        .await
        .unwrap();
    assert_eq!(participants.len(), 2);
}

async fn futures_join<T: Send + 'static>(
    handles: Vec<tokio::task::JoinHandle<T>>,
) -> Vec<T> {
    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        out.push(handle.await.unwrap());
    }
    out
}
