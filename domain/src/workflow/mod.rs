//! Workflow aggregates: the accord entity, its phase machine, participants,
//! and round-scoped responses.

pub mod accord;
pub mod participant;
pub mod phase;
pub mod response;
