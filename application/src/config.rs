//! Runtime policy for the coordination services
//!
//! These are plain structs the composition root fills in (typically from
//! the infrastructure config loader) and hands to the services.

use std::time::Duration;

/// Policy for issuing and redeeming invitations
#[derive(Debug, Clone)]
pub struct InvitePolicy {
    /// Time-to-live of a fresh invitation
    pub ttl: chrono::Duration,
    /// How many redemptions one invitation admits
    pub max_uses: u32,
    /// Redemption attempts allowed per origin per window
    pub join_attempts_per_hour: u32,
    /// Base URL for rendered invite links
    pub join_url_base: String,
}

impl Default for InvitePolicy {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::days(30),
            max_uses: 1,
            join_attempts_per_hour: 10,
            join_url_base: "https://accord.example/join".to_string(),
        }
    }
}

impl InvitePolicy {
    pub fn invite_url(&self, token: &str) -> String {
        format!("{}/{}", self.join_url_base.trim_end_matches('/'), token)
    }
}

/// Policy for synthesizer invocations
#[derive(Debug, Clone)]
pub struct SynthesisPolicy {
    /// Upper bound on one synthesizer call; also caps how long the
    /// per-accord lock is held across the await.
    pub timeout: Duration,
    /// Resolution advice below this option count is a failed synthesis.
    pub min_options: usize,
    /// Extra attempts for resolution advice before surfacing the error.
    pub retry_budget: u32,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            min_options: accord_domain::ResolutionAdvice::MIN_OPTIONS,
            retry_budget: 1,
        }
    }
}
