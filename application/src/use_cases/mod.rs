//! Use cases: the RPC-surface operations
//!
//! One struct per operation with typed input/output and its own error
//! enum. Authorization (owner vs participant vs stranger) happens here,
//! at the boundary; the services below assume it was done. Every error
//! exposes a stable machine-readable `code()` alongside its display
//! message, and no error or log line ever carries a raw token or hash.

pub mod accord_status;
pub mod create_accord;
pub mod current_invite;
pub mod generate_invite;
pub mod join_accord;
pub mod sign_agreement;
pub mod submit_response;
pub mod suggest_resolutions;
