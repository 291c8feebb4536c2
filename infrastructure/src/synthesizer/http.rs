//! HTTP synthesizer adapter (feature `http-synthesizer`)
//!
//! POSTs alignment and resolution requests as JSON to a configured
//! endpoint. Every failure mode maps to a retryable synthesis error;
//! an answer with fewer than the contract's minimum resolution options
//! is rejected here rather than passed upstream.

use accord_application::{SynthesisError, Synthesizer};
use accord_domain::{
    AlignmentReport, AlignmentRequest, ResolutionAdvice, ResolutionRequest,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// [`Synthesizer`] backed by a remote HTTP service
pub struct HttpSynthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSynthesizer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp, SynthesisError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::Transport(format!(
                "{path} returned {status}"
            )));
        }
        debug!(%url, %status, "synthesizer endpoint answered");
        response
            .json::<Resp>()
            .await
            .map_err(|e| SynthesisError::InvalidResult(e.to_string()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        // The client timeout; callers may apply a tighter outer bound
        SynthesisError::Transport(format!("request timed out: {e}"))
    } else {
        SynthesisError::Transport(e.to_string())
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn analyze_alignment(
        &self,
        request: &AlignmentRequest,
    ) -> Result<AlignmentReport, SynthesisError> {
        self.post("analyze", request).await
    }

    async fn suggest_resolutions(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionAdvice, SynthesisError> {
        let advice: ResolutionAdvice = self.post("resolutions", request).await?;
        if !advice.is_valid() {
            return Err(SynthesisError::InvalidResult(format!(
                "endpoint returned {} resolution options, need at least {}",
                advice.options.len(),
                ResolutionAdvice::MIN_OPTIONS
            )));
        }
        Ok(advice)
    }
}
