//! Judge service: scores queries with the in-process pipeline.
//!
//! Weights are loaded once before the port is bound; a missing or invalid
//! weights file aborts startup.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use cair_core::{
    Assessment, CoreError, Destination, Embedder, Grade, HashingEmbedder, HttpEmbedder, Judge,
    JudgeModel, Pipeline, Projection, Query, Via, PROJECTION_SEED,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::config::JudgeConfig;
use crate::error::ApiError;

pub const SERVICE: &str = "cair-judge";

#[derive(Clone)]
pub struct JudgeState {
    pipeline: Pipeline,
}

impl JudgeState {
    /// Refuses a pipeline whose judge has no weights.
    pub fn new(pipeline: Pipeline) -> Result<Self, CoreError> {
        pipeline.judge().model()?;
        Ok(Self { pipeline })
    }

    pub fn from_config(cfg: &JudgeConfig) -> Result<Self, CoreError> {
        let model = JudgeModel::load(&cfg.weights)?;
        info!(
            weights = %cfg.weights.display(),
            fingerprint = model.fingerprint(),
            "judge weights loaded"
        );

        let embedder: Arc<dyn Embedder> = match &cfg.embedder_url {
            Some(url) => Arc::new(
                HttpEmbedder::new(
                    url.clone(),
                    cfg.embedder_model.clone(),
                    Duration::from_secs(cfg.embedder_timeout_secs),
                )
                .map_err(|e| CoreError::Embed {
                    provider: "http".to_string(),
                    message: e.to_string(),
                })?,
            ),
            None => Arc::new(HashingEmbedder::new()),
        };
        info!(embedder = embedder.name(), model = %embedder.model_id(), "embedder configured");

        Self::new(Pipeline::new(
            embedder,
            Arc::new(Projection::standard()),
            Judge::new(model),
        ))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

pub fn router(state: JudgeState) -> Router {
    Router::new()
        .route("/", get(identity))
        .route("/health", get(health))
        .route("/api/premium", post(premium))
        .route("/api/score", post(score_embedding))
        .with_state(state)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PremiumRequest {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeInfo {
    pub letter: Grade,
    pub min_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingInfo {
    pub destination: Destination,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumResponse {
    pub score: f64,
    pub grade: GradeInfo,
    pub routing: RoutingInfo,
    pub via: Via,
    pub model: String,
}

impl PremiumResponse {
    fn new(assessment: Assessment, model: &str) -> Self {
        Self {
            score: assessment.score,
            grade: GradeInfo {
                letter: assessment.grade,
                min_score: assessment.grade.min_score(),
            },
            routing: RoutingInfo {
                destination: assessment.destination,
                valid: assessment.valid(),
            },
            via: Via::Judge,
            model: model.to_string(),
        }
    }
}

async fn identity(State(state): State<JudgeState>) -> Json<Value> {
    Json(json!({
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.pipeline.judge().fingerprint(),
        "embedder": state.pipeline.embedder_name(),
        "projection_seed": PROJECTION_SEED,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn premium(
    State(state): State<JudgeState>,
    req: Result<Json<PremiumRequest>, JsonRejection>,
) -> Result<Json<PremiumResponse>, ApiError> {
    let Json(req) = req.map_err(ApiError::from_rejection)?;
    let query = Query::new(req.query, None, None)?;

    let assessment = state.pipeline.assess(&query).await?;
    info!(
        score = assessment.score,
        grade = %assessment.grade,
        destination = %assessment.destination,
        "scored query"
    );
    Ok(Json(PremiumResponse::new(assessment, model_id(&state))))
}

async fn score_embedding(
    State(state): State<JudgeState>,
    req: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<PremiumResponse>, ApiError> {
    let Json(req) = req.map_err(ApiError::from_rejection)?;
    let assessment = state.pipeline.assess_projected(&req.embedding)?;
    Ok(Json(PremiumResponse::new(assessment, model_id(&state))))
}

fn model_id(state: &JudgeState) -> &str {
    state.pipeline.judge().fingerprint().unwrap_or_default()
}
