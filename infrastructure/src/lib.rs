//! Infrastructure layer for accord
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the in-memory store, token and attestation crypto,
//! the rate limiter, synthesizer adapters, the system clock, and
//! configuration file loading.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod limiter;
pub mod store;
pub mod synthesizer;

// Re-export commonly used types
pub use clock::SystemClock;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileCryptoConfig, FileInviteConfig,
    FileLoggingConfig, FileSynthesizerConfig,
};
pub use crypto::{attestation::HashAttestation, token::AeadTokenCrypto};
pub use limiter::FixedWindowLimiter;
pub use store::memory::MemoryStore;
pub use synthesizer::rule_based::RuleBasedSynthesizer;
#[cfg(feature = "http-synthesizer")]
pub use synthesizer::http::HttpSynthesizer;
