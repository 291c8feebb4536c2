//! Agreement attestation: canonical snapshots and signatures.

pub mod signature;
pub mod snapshot;
