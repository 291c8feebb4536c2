//! Invitation value objects and lifecycle rules.

pub mod invitation;
pub mod token;
