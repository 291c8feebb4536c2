//! Domain layer for accord
//!
//! This crate contains the core business logic, entities, and value objects
//! for decision-alignment workflows ("accords"). It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Accord
//!
//! An accord is one decision-alignment workflow between participants. It
//! advances through rounds: each participant submits answers independently,
//! a synthesizer detects agreement and conflict, and participants iterate
//! through resolution rounds until every participant has signed.
//!
//! ## Round
//!
//! One submit -> synthesize -> resolve cycle. A round is *satisfied* when
//! every current participant has a submitted response for it.
//!
//! ## Attestation
//!
//! Agreement signatures here are hash-derived attestations over a canonical
//! snapshot of the round content, not asymmetric-key signatures. See
//! [`agreement::Signature`].

pub mod agreement;
pub mod core;
pub mod invite;
pub mod synthesis;
pub mod workflow;

// Re-export commonly used types
pub use agreement::{
    signature::{Signature, SnapshotHash},
    snapshot::{AnalysisDigest, CanonicalSnapshot, SnapshotAnswer},
};
pub use core::{
    error::{StateConflict, ValidationError},
    ids::{AccordId, InvitationId, ParticipantId, UserId},
};
pub use invite::{
    invitation::{Invitation, InviteUsability},
    token::{InviteToken, TokenCiphertext, TokenHash},
};
pub use synthesis::{
    advice::{AdviceRecord, ResolutionAdvice, ResolutionOption},
    analysis::{AlignedItem, AlignmentReport, AlignmentScore, Analysis, Conflict, ConflictPosition, ConflictSeverity},
    position::{AlignmentRequest, ParticipantPosition, ResolutionRequest},
};
pub use workflow::{
    accord::Accord,
    participant::{Participant, ParticipantRole},
    phase::AccordPhase,
    response::{round_satisfied, Response},
};
