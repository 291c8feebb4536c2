//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file
//! and convert into the application layer's runtime policies.
//!
//! Example configuration:
//!
//! ```toml
//! [invites]
//! ttl_days = 30
//! max_uses = 1
//! join_attempts_per_hour = 10
//! join_url_base = "https://accord.example/join"
//!
//! [synthesizer]
//! kind = "rule-based"          # or "http"
//! timeout_seconds = 30
//! retry_budget = 1
//!
//! [crypto]
//! token_key = "long-random-key-material"
//!
//! [logging]
//! level = "info"
//! ```

use accord_application::{InvitePolicy, SynthesisPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invites.ttl_days cannot be 0")]
    InvalidTtl,

    #[error("invites.max_uses cannot be 0")]
    InvalidMaxUses,

    #[error("synthesizer.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("synthesizer.kind = \"http\" requires synthesizer.endpoint")]
    MissingEndpoint,

    #[error("unknown synthesizer.kind '{0}', expected \"rule-based\" or \"http\"")]
    UnknownSynthesizerKind(String),
}

/// `[invites]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInviteConfig {
    /// Time-to-live of a fresh invitation, in days
    pub ttl_days: i64,
    /// Redemptions one invitation admits
    pub max_uses: u32,
    /// Join attempts allowed per origin per hour
    pub join_attempts_per_hour: u32,
    /// Base URL for rendered invite links
    pub join_url_base: String,
}

impl Default for FileInviteConfig {
    fn default() -> Self {
        Self {
            ttl_days: 30,
            max_uses: 1,
            join_attempts_per_hour: 10,
            join_url_base: "https://accord.example/join".to_string(),
        }
    }
}

/// `[synthesizer]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSynthesizerConfig {
    /// "rule-based" or "http"
    pub kind: String,
    /// Endpoint base URL, required for kind = "http"
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    /// Extra attempts for resolution advice before surfacing failure
    pub retry_budget: u32,
}

impl Default for FileSynthesizerConfig {
    fn default() -> Self {
        Self {
            kind: "rule-based".to_string(),
            endpoint: None,
            timeout_seconds: 30,
            retry_budget: 1,
        }
    }
}

/// `[crypto]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCryptoConfig {
    /// Key material for invite-token sealing. When absent a random
    /// per-process key is used and stored ciphertexts do not survive a
    /// restart.
    pub token_key: Option<String>,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Default tracing filter when RUST_LOG and -v are absent
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Root configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub invites: FileInviteConfig,
    pub synthesizer: FileSynthesizerConfig,
    pub crypto: FileCryptoConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.invites.ttl_days == 0 {
            return Err(ConfigValidationError::InvalidTtl);
        }
        if self.invites.max_uses == 0 {
            return Err(ConfigValidationError::InvalidMaxUses);
        }
        if self.synthesizer.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        match self.synthesizer.kind.as_str() {
            "rule-based" => Ok(()),
            "http" if self.synthesizer.endpoint.is_some() => Ok(()),
            "http" => Err(ConfigValidationError::MissingEndpoint),
            other => Err(ConfigValidationError::UnknownSynthesizerKind(
                other.to_string(),
            )),
        }
    }

    pub fn invite_policy(&self) -> InvitePolicy {
        InvitePolicy {
            ttl: chrono::Duration::days(self.invites.ttl_days),
            max_uses: self.invites.max_uses,
            join_attempts_per_hour: self.invites.join_attempts_per_hour,
            join_url_base: self.invites.join_url_base.clone(),
        }
    }

    pub fn synthesis_policy(&self) -> SynthesisPolicy {
        SynthesisPolicy {
            timeout: std::time::Duration::from_secs(self.synthesizer.timeout_seconds),
            retry_budget: self.synthesizer.retry_budget,
            ..SynthesisPolicy::default()
        }
    }
}
