//! Application layer for accord
//!
//! This crate contains the coordination services, port definitions, and
//! the RPC-surface use cases. It depends only on the domain layer;
//! adapters implementing the ports live in the infrastructure layer.
//!
//! # Services
//!
//! - [`RoundCoordinator`] — the round-based state machine: records
//!   submissions, detects satisfied rounds, drives synthesis, and
//!   advances phases atomically.
//! - [`SignatureLedger`] — collects per-round attestations and completes
//!   the accord on quorum.
//! - [`InvitationLedger`] — issues, invalidates, and redeems single-use
//!   invite tokens.
//! - [`ParticipantRegistry`] — membership and role checks.

pub mod config;
pub mod coordinator;
pub mod invitations;
pub mod locks;
pub mod ports;
pub mod registry;
pub mod signatures;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{InvitePolicy, SynthesisPolicy};
pub use coordinator::{CoordinationError, RoundCoordinator, SubmissionOutcome};
pub use invitations::{InvitationLedger, InviteError, IssuedInvite};
pub use locks::AccordLocks;
pub use ports::{
    attestation::{AttestationCrypto, AttestationError},
    clock::{Clock, ManualClock},
    rate_limit::{RateLimiter, Unlimited},
    store::{InvitationStore, StoreError, StoreResult, WorkflowStore},
    synthesizer::{SynthesisError, Synthesizer},
    token_crypto::{GeneratedToken, TokenCrypto, TokenCryptoError},
};
pub use registry::{ParticipantRegistry, RegistryError};
pub use signatures::{SignOutcome, SignatureError, SignatureLedger};
pub use use_cases::{
    accord_status::{AccordStatusError, AccordStatusInput, AccordStatusOutput, AccordStatusUseCase},
    create_accord::{CreateAccordError, CreateAccordInput, CreateAccordOutput, CreateAccordUseCase},
    current_invite::{
        CurrentInviteError, CurrentInviteInput, CurrentInviteOutput, CurrentInviteUseCase,
    },
    generate_invite::{
        GenerateInviteError, GenerateInviteInput, GenerateInviteOutput, GenerateInviteUseCase,
        RegenerateInviteUseCase,
    },
    join_accord::{JoinAccordError, JoinAccordInput, JoinAccordOutput, JoinAccordUseCase},
    sign_agreement::{SignAgreementError, SignAgreementInput, SignAgreementOutput, SignAgreementUseCase},
    submit_response::{
        SubmitResponseError, SubmitResponseInput, SubmitResponseOutput, SubmitResponseUseCase,
    },
    suggest_resolutions::{
        SuggestResolutionsError, SuggestResolutionsInput, SuggestResolutionsOutput,
        SuggestResolutionsUseCase,
    },
};
