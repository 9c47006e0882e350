//! Bridge service: validation façade in front of the judge.
//!
//! `/validate` never fails for a non-empty query. Any judge failure (connect
//! error, timeout, non-2xx, malformed reply) falls back to the basic rule and
//! is visible to the caller as `via = "basic"`.

mod client;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use cair_core::{basic_decision, Constitution, Decision, Query, Via};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

pub use client::JudgeClient;

use crate::config::BridgeConfig;
use crate::error::ApiError;
use crate::upstream::UpstreamError;

pub const SERVICE: &str = "cair-bridge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Bridge {
    judge: JudgeClient,
}

impl Bridge {
    pub fn new(judge: JudgeClient) -> Self {
        Self { judge }
    }

    pub fn from_config(cfg: &BridgeConfig) -> Result<Self, UpstreamError> {
        Ok(Self::new(JudgeClient::new(&cfg.judge_url, cfg.timeout())?))
    }

    pub fn judge_url(&self) -> &str {
        self.judge.url()
    }

    /// Judge verdict, or the basic rule when the judge call fails.
    pub async fn decide(&self, query: &Query) -> Decision {
        match self.judge.score(query.text()).await {
            Ok(score) => {
                let decision = Decision::from_judge(score);
                info!(
                    agent = query.agent(),
                    score = decision.score,
                    grade = %decision.grade,
                    destination = %decision.destination,
                    "judge decision"
                );
                decision
            }
            Err(e) => {
                let decision = basic_decision(query.text(), Via::Basic);
                warn!(
                    agent = query.agent(),
                    error = %e,
                    kind = %e.kind(),
                    valid = decision.valid,
                    "judge unavailable, applied basic rule"
                );
                decision
            }
        }
    }
}

pub fn router(bridge: Bridge) -> Router {
    Router::new()
        .route("/", get(identity))
        .route("/health", get(health))
        .route("/validate", post(validate))
        .route("/constitution", get(constitution))
        .with_state(bridge)
}

async fn identity(State(bridge): State<Bridge>) -> Json<Value> {
    Json(json!({
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
        "peers": { "judge": bridge.judge_url() },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn validate(
    State(bridge): State<Bridge>,
    req: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<Decision>, ApiError> {
    let Json(req) = req.map_err(ApiError::from_rejection)?;
    let query = Query::new(req.content, req.agent, req.context)?;
    Ok(Json(bridge.decide(&query).await))
}

async fn constitution() -> Json<Constitution> {
    Json(Constitution::default())
}
