//! Core domain primitives: identifiers and the shared error vocabulary.

pub mod error;
pub mod ids;
