//! Synthesizer port
//!
//! The external capability that turns raw positions into structured
//! alignment reports and resolution options. Every error here is
//! retryable: a failed or timed-out synthesis leaves the accord in
//! `Analyzing` so the same triggering operation can re-attempt it
//! without re-collecting responses.

use accord_domain::{AlignmentReport, AlignmentRequest, ResolutionAdvice, ResolutionRequest};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("synthesizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("synthesizer transport failure: {0}")]
    Transport(String),

    /// The synthesizer answered, but with content that violates its
    /// contract (e.g. fewer than three resolution options).
    #[error("synthesizer returned an invalid result: {0}")]
    InvalidResult(String),
}

/// External synthesis capability
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Compares all submitted positions of one round and reports
    /// aligned items, conflicts, assumptions, gaps, imbalances, and an
    /// alignment score.
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError>;

    /// Proposes compromise options for one conflict. Implementations
    /// must return at least [`ResolutionAdvice::MIN_OPTIONS`] options;
    /// callers treat anything less as [`SynthesisError::InvalidResult`].
    async fn suggest_resolutions(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError>;
}
