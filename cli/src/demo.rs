//! Scripted two-party workflow against the in-memory stack
//!
//! Walks one accord through every phase: draft, invitation, joining,
//! conflicting round-one answers, resolution advice, a converging
//! second round, and both signatures. Prints each transition so the
//! whole lifecycle is visible from a terminal.

use accord_application::{
    AccordLocks, AccordStatusInput, AccordStatusUseCase, CreateAccordInput, CreateAccordUseCase,
    GenerateInviteInput, GenerateInviteUseCase, InvitationLedger, JoinAccordInput,
    JoinAccordUseCase, ParticipantRegistry, RoundCoordinator, SignAgreementInput,
    SignAgreementUseCase, SignatureLedger, SubmitResponseInput, SubmitResponseUseCase,
    SuggestResolutionsInput, SuggestResolutionsUseCase,
};
use accord_domain::UserId;
use accord_infrastructure::{
    AeadTokenCrypto, FileConfig, FixedWindowLimiter, HashAttestation, MemoryStore,
    RuleBasedSynthesizer, SystemClock,
};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub async fn run(config: &FileConfig) -> Result<()> {
    let invite_policy = config.invite_policy();
    let synthesis_policy = config.synthesis_policy();

    // === Dependency injection ===
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(SystemClock);
    let locks = Arc::new(AccordLocks::new());
    let crypto = Arc::new(match &config.crypto.token_key {
        Some(key) => AeadTokenCrypto::new(key.as_bytes()),
        None => AeadTokenCrypto::ephemeral(),
    });
    let synthesizer = Arc::new(RuleBasedSynthesizer::new());
    let limiter = Arc::new(FixedWindowLimiter::per_hour(
        invite_policy.join_attempts_per_hour,
        clock.clone(),
    ));

    let registry = Arc::new(ParticipantRegistry::new(store.clone()));
    let invitations = Arc::new(InvitationLedger::new(
        store.clone(),
        store.clone(),
        crypto,
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
        locks,
        clock.clone(),
    ));

    let create = CreateAccordUseCase::new(store.clone(), clock.clone());
    let generate_invite = GenerateInviteUseCase::new(
        invitations.clone(),
        registry.clone(),
        invite_policy.join_url_base.clone(),
    );
    let join = JoinAccordUseCase::new(invitations, limiter);
    let submit = SubmitResponseUseCase::new(coordinator);
    let suggest = SuggestResolutionsUseCase::new(
        store.clone(),
        synthesizer,
        registry.clone(),
        clock,
        synthesis_policy,
    );
    let sign = SignAgreementUseCase::new(signatures);
    let status = AccordStatusUseCase::new(store, registry);

    let owner = UserId::new("ana");
    let partner = UserId::new("ben");

    // === Scenario ===
    println!("== accord demo: vacation planning ==\n");

    let created = create
        .execute(CreateAccordInput {
            title: "Vacation planning".to_string(),
            owner: owner.clone(),
        })
        .await?;
    let accord_id = created.accord_id;
    println!("[draft]     accord created: {accord_id}");

    let invite = generate_invite
        .execute(GenerateInviteInput {
            accord_id,
            caller: owner.clone(),
        })
        .await?;
    println!("[draft]     invite issued, expires {}", invite.expires_at);
    println!("            {}", invite.invite_url);

    join.execute(JoinAccordInput {
        token: invite.token,
        caller: partner.clone(),
        origin: "demo-terminal".to_string(),
    })
    .await?;
    println!("[active]    partner joined, accord is live\n");

    let round_one = [
        (&owner, json!({"budget": "$500", "dates": "July", "destination": "coast"})),
        (&partner, json!({"budget": "$800", "dates": "July", "destination": "coast"})),
    ];
    for (who, answers) in round_one {
        let outcome = submit
            .execute(SubmitResponseInput {
                accord_id,
                caller: who.clone(),
                round: 1,
                answers,
            })
            .await?;
        println!(
            "[round 1]   {who} submitted (round satisfied: {})",
            outcome.both_submitted
        );
    }

    let view = status
        .execute(AccordStatusInput {
            accord_id,
            caller: owner.clone(),
        })
        .await?;
    let overview = view
        .latest_analysis
        .ok_or_else(|| anyhow::anyhow!("round 1 analysis missing"))?;
    println!(
        "[analyzed]  alignment {}/100, {} aligned, {} in conflict\n",
        overview.score, overview.aligned_count, overview.conflict_count
    );

    for conflict_index in 0..overview.conflict_count {
        let advice = suggest
            .execute(SuggestResolutionsInput {
                accord_id,
                caller: owner.clone(),
                round: 1,
                conflict_index,
            })
            .await?;
        println!("[resolving] options for conflict {conflict_index}:");
        for option in &advice.advice.options {
            println!("            - {}", option.summary);
        }
    }
    println!();

    let resolution = json!({"budget": "$650", "dates": "July", "destination": "coast"});
    for who in [&owner, &partner] {
        let outcome = submit
            .execute(SubmitResponseInput {
                accord_id,
                caller: who.clone(),
                round: 1,
                answers: resolution.clone(),
            })
            .await?;
        if outcome.both_submitted {
            println!("[round 2]   resolutions in, re-analyzed as round {}", outcome.next_round);
        } else {
            println!("[round 2]   {who} submitted a resolution");
        }
    }

    let view = status
        .execute(AccordStatusInput {
            accord_id,
            caller: owner.clone(),
        })
        .await?;
    let round = view.round;
    println!(
        "[analyzed]  round {round} alignment {}/100\n",
        view.latest_analysis.map(|a| a.score).unwrap_or_default()
    );

    for who in [&owner, &partner] {
        let outcome = sign
            .execute(SignAgreementInput {
                accord_id,
                caller: who.clone(),
                round,
            })
            .await?;
        println!(
            "[{}]  {who} signed (all signed: {})",
            outcome.accord_status, outcome.all_signed
        );
    }

    println!("\n== agreement complete ==");
    Ok(())
}
