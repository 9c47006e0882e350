use std::time::Duration;

use cair_core::Decision;

use crate::bridge::ValidateRequest;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Client for the bridge's `/validate` endpoint.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    upstream: UpstreamClient,
}

impl BridgeClient {
    pub fn new(bridge_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: UpstreamClient::new("bridge", bridge_url, timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        self.upstream.base_url()
    }

    /// One attempt; the bridge's decision is passed through unchanged.
    pub async fn validate(&self, req: &ValidateRequest) -> Result<Decision, UpstreamError> {
        let decision: Decision = self.upstream.post_json("/validate", req).await?;
        if !decision.score.is_finite() {
            return Err(UpstreamError::Malformed {
                service: self.upstream.service(),
                message: "non-finite score".to_string(),
            });
        }
        Ok(decision)
    }
}
