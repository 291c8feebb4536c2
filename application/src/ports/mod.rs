//! Port definitions
//!
//! Interfaces the application layer depends on. Implementations
//! (adapters) live in the infrastructure layer.

pub mod attestation;
pub mod clock;
pub mod rate_limit;
pub mod store;
pub mod synthesizer;
pub mod token_crypto;
