//! Judge service endpoints with a seeded model.

mod common;

use cair_core::{ErrorKind, Judge, JudgeModel, Pipeline, JUDGE_DIM};
use cair_server::judge::{self, JudgeState};
use cair_server::JudgeConfig;
use common::TestServer;
use serde_json::json;

fn seeded_state() -> JudgeState {
    JudgeState::new(Pipeline::with_judge(Judge::new(JudgeModel::seeded(7).unwrap()))).expect("ready")
}

#[tokio::test]
async fn test_premium_response_shape() {
    let state = seeded_state();
    let fingerprint = state
        .pipeline()
        .judge()
        .fingerprint()
        .map(str::to_string)
        .expect("fingerprint");
    let server = TestServer::start(judge::router(state)).await;

    let (status, body) = server
        .post("/api/premium", &json!({ "query": "Explain constitutional AI principles" }))
        .await;
    assert_eq!(status, 200);

    let score = body["score"].as_f64().expect("score");
    assert!((0.0..=100.0).contains(&score));
    assert!(body["grade"]["letter"].is_string());
    assert!(body["grade"]["min_score"].as_f64().expect("min_score") <= score);
    assert!(["PREMIUM", "LOCAL", "SANDBOX"]
        .contains(&body["routing"]["destination"].as_str().expect("destination")));
    assert_eq!(body["routing"]["valid"], score >= 70.0);
    assert_eq!(body["via"], "judge");
    assert_eq!(body["model"], fingerprint.as_str());
}

#[tokio::test]
async fn test_premium_is_deterministic() {
    let a = TestServer::start(judge::router(seeded_state())).await;
    let b = TestServer::start(judge::router(seeded_state())).await;
    let query = json!({ "query": "Summarize the release notes" });

    let (_, first) = a.post("/api/premium", &query).await;
    let (_, again) = a.post("/api/premium", &query).await;
    let (_, other) = b.post("/api/premium", &query).await;
    assert_eq!(first["score"], again["score"]);
    assert_eq!(first["score"], other["score"]);
}

#[tokio::test]
async fn test_score_endpoint_checks_width() {
    let server = TestServer::start(judge::router(seeded_state())).await;

    let (status, body) = server
        .post("/api/score", &json!({ "embedding": vec![0.0f32; JUDGE_DIM] }))
        .await;
    assert_eq!(status, 200);
    // Zero input with zero biases lands on the sigmoid midpoint.
    assert_eq!(body["score"], 50.0);
    assert_eq!(body["routing"]["destination"], "SANDBOX");

    let (status, body) = server
        .post("/api/score", &json!({ "embedding": [0.1, 0.2, 0.3] }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "input");
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let server = TestServer::start(judge::router(seeded_state())).await;
    let (status, body) = server.post("/api/premium", &json!({ "query": "" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_identity_reports_model() {
    let server = TestServer::start(judge::router(seeded_state())).await;
    let (_, body) = server.get("/").await;
    assert_eq!(body["service"], "cair-judge");
    assert_eq!(body["embedder"], "hashing");
    assert_eq!(body["projection_seed"], 42);
    assert!(body["model"].as_str().is_some_and(|m| m.starts_with("sha256:")));
}

#[test]
fn test_missing_weights_is_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = JudgeConfig {
        weights: dir.path().join("absent.json"),
        ..JudgeConfig::default()
    };
    let err = JudgeState::from_config(&cfg).err().expect("must fail");
    assert_eq!(err.kind(), ErrorKind::NotReady);

    let err = JudgeState::new(Pipeline::with_judge(Judge::unloaded()))
        .err()
        .expect("must fail");
    assert_eq!(err.kind(), ErrorKind::NotReady);
}

#[test]
fn test_weights_written_then_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models/judge.json");
    cair_core::WeightsFile::seeded(3).write(&path).unwrap();

    let cfg = JudgeConfig {
        weights: path,
        ..JudgeConfig::default()
    };
    let state = JudgeState::from_config(&cfg).expect("loads");
    assert!(state.pipeline().judge().is_ready());
}
