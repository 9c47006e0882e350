//! Enhance service: command endpoint and workspace file access.
//!
//! `/api/enhance` and `/api/file` report domain failures in-band (HTTP 200,
//! `{status: "error", message}`); only an unparseable body is an HTTP 400.
//! Filesystem access goes through [`Workspace`] without exception.

mod bridge_client;
pub mod files;
pub mod fix;
pub mod scan;
pub mod workspace;

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cair_core::{basic_decision, Decision, Via};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub use bridge_client::BridgeClient;
pub use files::{FileEntry, FileRequest};
pub use fix::FixReport;
pub use scan::{Issue, IssueKind, ScanOptions, ScanReport};
pub use workspace::{Workspace, WorkspaceError};

use crate::bridge::ValidateRequest;
use crate::config::EnhanceConfig;
use crate::error::{in_band, ApiError};

pub const SERVICE: &str = "cair-enhance";

#[derive(Debug, Clone)]
pub struct EnhanceState {
    bridge: BridgeClient,
    default_workspace: Option<Workspace>,
    max_read_bytes: u64,
    scan: ScanOptions,
}

impl EnhanceState {
    pub fn new(bridge: BridgeClient, default_workspace: Option<Workspace>) -> Self {
        Self {
            bridge,
            default_workspace,
            max_read_bytes: scan::MAX_FILE_BYTES,
            scan: ScanOptions::default(),
        }
    }

    pub fn with_max_read_bytes(mut self, max_read_bytes: u64) -> Self {
        self.max_read_bytes = max_read_bytes;
        self
    }

    /// The default workspace is the configured root, else the working directory.
    pub fn from_config(cfg: &EnhanceConfig) -> anyhow::Result<Self> {
        let bridge = BridgeClient::new(&cfg.bridge_url, cfg.timeout())
            .context("failed to build bridge client")?;

        let root: PathBuf = match &cfg.workspace {
            Some(p) => p.clone(),
            None => std::env::current_dir().context("failed to read working directory")?,
        };
        let workspace = Workspace::open(&root)
            .with_context(|| format!("invalid default workspace {}", root.display()))?;
        info!(workspace = %workspace.root().display(), bridge = bridge.url(), "enhance configured");

        Ok(Self::new(bridge, Some(workspace)).with_max_read_bytes(cfg.max_read_bytes))
    }
}

pub fn router(state: EnhanceState) -> Router {
    Router::new()
        .route("/", get(identity))
        .route("/health", get(health))
        .route("/api/enhance", post(enhance))
        .route("/api/file", post(file))
        .with_state(state)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnhanceRequest {
    pub command: String,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// `{status: "success", ...body}`
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub body: T,
}

fn success<T: Serialize>(body: T) -> Response {
    Json(Success {
        status: "success",
        body,
    })
    .into_response()
}

fn error(message: impl Into<String>) -> Response {
    in_band(message).into_response()
}

async fn identity(State(state): State<EnhanceState>) -> Json<Value> {
    Json(json!({
        "service": SERVICE,
        "version": env!("CARGO_PKG_VERSION"),
        "peers": { "bridge": state.bridge.url() },
        "commands": ["validate", "scan", "fix"],
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn enhance(
    State(state): State<EnhanceState>,
    req: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = req.map_err(ApiError::from_rejection)?;
    debug!(command = %req.command, "enhance request");

    let response = match req.command.as_str() {
        "validate" => {
            let workspace = req.workspace.as_deref().map(Workspace::open).transpose();
            if let Err(e) = workspace {
                error(e.to_string())
            } else if req.content.as_deref().is_some_and(|c| !c.trim().is_empty()) {
                let (decision, _) = run_validate(&state.bridge, validate_request(&req)).await;
                success(decision)
            } else {
                error("content is required for validate")
            }
        }
        "scan" => match open_request_workspace(req.workspace.as_deref()) {
            Ok(ws) => {
                let opts = state.scan;
                let path = req.path.clone();
                blocking(move || scan::scan_workspace(&ws, path.as_deref(), &opts)).await
            }
            Err(e) => error(e.to_string()),
        },
        "fix" => match open_request_workspace(req.workspace.as_deref()) {
            Ok(_) if req.issues.is_empty() => error("issues are required for fix"),
            Ok(ws) => {
                let issues = req.issues.clone();
                blocking(move || Ok(fix::apply_fixes(&ws, &issues))).await
            }
            Err(e) => error(e.to_string()),
        },
        other => error(format!("Unknown command: {}", other)),
    };
    Ok(response)
}

async fn file(
    State(state): State<EnhanceState>,
    req: Result<Json<FileRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = req.map_err(ApiError::from_rejection)?;

    let ws = match req.workspace.as_deref() {
        Some(raw) => match Workspace::open(raw) {
            Ok(ws) => ws,
            Err(e) => return Ok(error(e.to_string())),
        },
        None => match &state.default_workspace {
            Some(ws) => ws.clone(),
            None => return Ok(error("No workspace configured")),
        },
    };

    let target = req.target();
    let result = match req.action.as_str() {
        "list" => files::list(&ws, &target).await.map(success),
        "read" => files::read(&ws, &target, state.max_read_bytes)
            .await
            .map(success),
        other => return Ok(error(format!("Unknown action: {}", other))),
    };

    Ok(result.unwrap_or_else(|e| {
        debug!(action = %req.action, path = %target, error = %e, kind = %e.kind(), "file request refused");
        error(e.to_string())
    }))
}

fn open_request_workspace(raw: Option<&str>) -> Result<Workspace, WorkspaceError> {
    match raw {
        Some(raw) => Workspace::open(raw),
        None => Err(WorkspaceError::Invalid {
            reason: "workspace is required".to_string(),
        }),
    }
}

/// Run filesystem work on the blocking pool and render the outcome.
async fn blocking<T, F>(work: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, WorkspaceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(body)) => success(body),
        Ok(Err(e)) => error(e.to_string()),
        Err(e) => {
            warn!(error = %e, "blocking task failed");
            error("internal error")
        }
    }
}

fn validate_request(req: &EnhanceRequest) -> ValidateRequest {
    ValidateRequest {
        content: req.content.clone().unwrap_or_default(),
        agent: req.agent.clone(),
        context: req.context.clone(),
    }
}

/// Stages of an enhance `validate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateStage {
    Received,
    BridgeCall,
    Fallback,
    Decided,
    Responded,
}

impl fmt::Display for ValidateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "RECEIVED",
            Self::BridgeCall => "BRIDGE_CALL",
            Self::Fallback => "FALLBACK",
            Self::Decided => "DECIDED",
            Self::Responded => "RESPONDED",
        };
        f.write_str(s)
    }
}

struct StageTrace(Vec<ValidateStage>);

impl StageTrace {
    fn enter(&mut self, stage: ValidateStage) {
        debug!(from = ?self.0.last().map(|s| s.to_string()), to = %stage, "validate stage");
        self.0.push(stage);
    }
}

/// Bridge verdict, or the basic rule with `via = "bridge-fallback"`.
///
/// Returns the decision and the stages it passed through.
pub async fn run_validate(
    bridge: &BridgeClient,
    req: ValidateRequest,
) -> (Decision, Vec<ValidateStage>) {
    let mut trace = StageTrace(Vec::with_capacity(5));
    trace.enter(ValidateStage::Received);
    trace.enter(ValidateStage::BridgeCall);

    let decision = match bridge.validate(&req).await {
        Ok(decision) => decision,
        Err(e) => {
            trace.enter(ValidateStage::Fallback);
            let decision = basic_decision(&req.content, Via::BridgeFallback);
            warn!(
                error = %e,
                kind = %e.kind(),
                valid = decision.valid,
                "bridge unavailable, applied basic rule"
            );
            decision
        }
    };

    trace.enter(ValidateStage::Decided);
    info!(
        score = decision.score,
        grade = %decision.grade,
        destination = %decision.destination,
        via = decision.via.as_str(),
        "validate decision"
    );
    trace.enter(ValidateStage::Responded);
    (decision, trace.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_bridge_takes_fallback_path() {
        // Port 9 (discard) on loopback is closed in test environments.
        let bridge = BridgeClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let req = ValidateRequest {
            content: "a sufficiently long message".to_string(),
            agent: None,
            context: None,
        };
        let (decision, stages) = run_validate(&bridge, req).await;
        assert_eq!(decision.via, Via::BridgeFallback);
        assert!(decision.valid);
        assert_eq!(decision.score, 0.8);
        assert_eq!(
            stages,
            vec![
                ValidateStage::Received,
                ValidateStage::BridgeCall,
                ValidateStage::Fallback,
                ValidateStage::Decided,
                ValidateStage::Responded,
            ]
        );
    }

    #[test]
    fn success_flattens_body() {
        let v = serde_json::to_value(Success {
            status: "success",
            body: Decision::from_judge(75.0),
        })
        .unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["destination"], "LOCAL");
        assert_eq!(v["via"], "judge");
    }

    #[test]
    fn stage_names_are_upper_snake() {
        assert_eq!(ValidateStage::BridgeCall.to_string(), "BRIDGE_CALL");
        assert_eq!(ValidateStage::Responded.to_string(), "RESPONDED");
    }
}
