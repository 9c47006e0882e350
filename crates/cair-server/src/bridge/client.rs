use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::upstream::{UpstreamClient, UpstreamError};

/// Only `score` is read; other fields in the judge reply are ignored.
#[derive(Debug, Deserialize)]
struct ScoreReply {
    score: f64,
}

/// Client for the judge's `/api/premium` endpoint.
#[derive(Debug, Clone)]
pub struct JudgeClient {
    upstream: UpstreamClient,
}

impl JudgeClient {
    pub fn new(judge_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: UpstreamClient::new("judge", judge_url, timeout)?,
        })
    }

    pub fn url(&self) -> &str {
        self.upstream.base_url()
    }

    /// One attempt. A score outside [0, 100] or non-finite counts as malformed.
    pub async fn score(&self, query: &str) -> Result<f64, UpstreamError> {
        let reply: ScoreReply = self
            .upstream
            .post_json("/api/premium", &json!({ "query": query }))
            .await?;

        if !reply.score.is_finite() || !(0.0..=100.0).contains(&reply.score) {
            return Err(UpstreamError::Malformed {
                service: self.upstream.service(),
                message: format!("score {} outside [0, 100]", reply.score),
            });
        }
        Ok(reply.score)
    }
}
