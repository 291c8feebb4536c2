//! Synthesizer adapters

#[cfg(feature = "http-synthesizer")]
pub mod http;
pub mod rule_based;

#[cfg(feature = "http-synthesizer")]
pub use http::HttpSynthesizer;
pub use rule_based::RuleBasedSynthesizer;
