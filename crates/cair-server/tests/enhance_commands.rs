//! `/api/enhance` commands: validate through the bridge, scan, fix.

mod common;

use std::time::Duration;

use cair_server::enhance::{self, BridgeClient, EnhanceState};
use common::{closed_port_url, TestServer};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn enhance_with_bridge(bridge_url: &str) -> TestServer {
    let bridge = BridgeClient::new(bridge_url, Duration::from_secs(2)).unwrap();
    TestServer::start(enhance::router(EnhanceState::new(bridge, None))).await
}

#[tokio::test]
async fn test_validate_passes_bridge_decision_through() {
    let bridge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 92.0,
            "grade": "A",
            "destination": "PREMIUM",
            "valid": true,
            "via": "judge",
            "scale": "0-100",
        })))
        .expect(1)
        .mount(&bridge)
        .await;
    let server = enhance_with_bridge(&bridge.uri()).await;

    let (status, body) = server
        .post(
            "/api/enhance",
            &json!({ "command": "validate", "content": "Explain constitutional AI principles" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    assert_eq!(body["via"], "judge");
    assert_eq!(body["destination"], "PREMIUM");
}

#[tokio::test]
async fn test_validate_falls_back_when_bridge_down() {
    let server = enhance_with_bridge(&closed_port_url().await).await;

    let (_, body) = server
        .post(
            "/api/enhance",
            &json!({ "command": "validate", "content": "hello" }),
        )
        .await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["via"], "bridge-fallback");
    assert_eq!(body["valid"], false);
    assert_eq!(body["score"], 0.3);
}

#[tokio::test]
async fn test_validate_falls_back_on_bad_bridge_reply() {
    let bridge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/validate"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&bridge)
        .await;
    let server = enhance_with_bridge(&bridge.uri()).await;

    let (_, body) = server
        .post(
            "/api/enhance",
            &json!({ "command": "validate", "content": "long enough content" }),
        )
        .await;
    assert_eq!(body["via"], "bridge-fallback");
    assert_eq!(body["valid"], true);
    assert_eq!(body["score"], 0.8);
}

#[tokio::test]
async fn test_scan_then_fix_round() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/lib.rs"), "pub fn a() {}   \n// TODO tidy\nend").unwrap();
    let workspace = dir.path().display().to_string();
    let server = enhance_with_bridge("http://127.0.0.1:9").await;

    let (_, scan) = server
        .post(
            "/api/enhance",
            &json!({ "command": "scan", "workspace": workspace }),
        )
        .await;
    assert_eq!(scan["status"], "success");
    assert_eq!(scan["files_scanned"], 1);
    let issues = scan["issues"].as_array().unwrap();
    let types: Vec<&str> = issues.iter().map(|i| i["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["trailing-whitespace", "todo-marker", "missing-final-newline"]
    );
    assert!(issues.iter().all(|i| i["file"] == "src/lib.rs"));

    let (_, fix) = server
        .post(
            "/api/enhance",
            &json!({ "command": "fix", "workspace": workspace, "issues": issues }),
        )
        .await;
    assert_eq!(fix["status"], "success");
    assert_eq!(fix["fixed"].as_array().unwrap().len(), 2);
    assert_eq!(fix["skipped"].as_array().unwrap().len(), 1);
    assert!(fix["rejected"].as_array().unwrap().is_empty());

    let content = std::fs::read_to_string(dir.path().join("src/lib.rs")).unwrap();
    assert_eq!(content, "pub fn a() {}\n// TODO tidy\nend\n");

    let (_, rescan) = server
        .post(
            "/api/enhance",
            &json!({ "command": "scan", "workspace": workspace }),
        )
        .await;
    let left: Vec<&str> = rescan["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["type"].as_str().unwrap())
        .collect();
    assert_eq!(left, vec!["todo-marker"]);
}

#[tokio::test]
async fn test_fix_outside_workspace_is_rejected() {
    let parent = tempfile::tempdir().unwrap();
    let ws = parent.path().join("ws");
    std::fs::create_dir(&ws).unwrap();
    std::fs::write(parent.path().join("victim.txt"), "untouched   ").unwrap();
    let server = enhance_with_bridge("http://127.0.0.1:9").await;

    let (_, body) = server
        .post(
            "/api/enhance",
            &json!({
                "command": "fix",
                "workspace": ws.display().to_string(),
                "issues": [{
                    "type": "trailing-whitespace",
                    "file": "../victim.txt",
                    "line": 1,
                    "fixable": true,
                    "message": "Trailing whitespace",
                }],
            }),
        )
        .await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["rejected"][0]["reason"], "Access denied");
    assert_eq!(
        std::fs::read_to_string(parent.path().join("victim.txt")).unwrap(),
        "untouched   "
    );
}

#[tokio::test]
async fn test_workspace_and_command_errors_are_in_band() {
    let server = enhance_with_bridge("http://127.0.0.1:9").await;

    let (status, body) = server
        .post(
            "/api/enhance",
            &json!({ "command": "scan", "workspace": "/definitely/not/here/cair" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid workspace"));

    let (_, body) = server.post("/api/enhance", &json!({ "command": "scan" })).await;
    assert_eq!(body["status"], "error");

    let (status, body) = server
        .post(
            "/api/enhance",
            &json!({
                "command": "validate",
                "workspace": "not/absolute/nowhere",
                "content": "hello world!!",
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid workspace"));

    let (_, body) = server
        .post("/api/enhance", &json!({ "command": "refactor" }))
        .await;
    assert_eq!(body["message"], "Unknown command: refactor");

    let (status, body) = server.post("/api/enhance", &json!({ "workspace": "/" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["kind"], "input");
}

#[tokio::test]
async fn test_validate_runs_through_bridge_to_judge() {
    let judge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/premium"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "score": 92.0 })))
        .mount(&judge)
        .await;

    let judge_client =
        cair_server::bridge::JudgeClient::new(&judge.uri(), Duration::from_secs(2)).unwrap();
    let bridge = TestServer::start(cair_server::bridge::router(cair_server::bridge::Bridge::new(
        judge_client,
    )))
    .await;
    let server = enhance_with_bridge(&format!("http://{}", bridge.addr)).await;

    let request = json!({ "command": "validate", "content": "Explain constitutional AI principles" });
    let (status, body) = server.post("/api/enhance", &request).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "success");
    assert_eq!(body["via"], "judge");
    assert_eq!(body["score"], 92.0);
    assert_eq!(body["grade"], "A");
    assert_eq!(body["destination"], "PREMIUM");

    // Judge now answers 404: the bridge applies its basic rule and enhance keeps that label.
    judge.reset().await;
    let (_, body) = server.post("/api/enhance", &request).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["via"], "basic");
    assert_eq!(body["score"], 0.8);
    assert_eq!(body["valid"], true);
}
