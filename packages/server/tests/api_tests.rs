//! End-to-end tests for the HTTP surface, against a real router and database.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use test_context::test_context;

use common::TestDb;
use server_core::common::RetryPolicy;
use server_core::kernel::{AgentReport, PipelineAgent};
use server_core::server::build_app;

/// Agent double that reports fixed counts without doing any work.
struct StubAgent;

#[async_trait]
impl PipelineAgent for StubAgent {
    async fn run_full(&self) -> anyhow::Result<AgentReport> {
        Ok(AgentReport {
            jobs_found: Some(2),
            artifacts_created: Some(1),
        })
    }

    async fn run_artifact_only(&self) -> anyhow::Result<AgentReport> {
        Ok(AgentReport {
            jobs_found: None,
            artifacts_created: Some(1),
        })
    }
}

/// Serve the app on an ephemeral port and return its base URL.
async fn spawn_server(ctx: &TestDb) -> String {
    let app = build_app(ctx.provider.clone(), Arc::new(StubAgent), RetryPolicy::none());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn save_jobs_via_op(base: &str, client: &reqwest::Client) -> Value {
    let response = client
        .post(format!("{base}/api/agent/op"))
        .json(&json!({
            "action": "Save jobs",
            "jobs": [
                {
                    "title": "AI Engineer",
                    "company": "TechCorp",
                    "link": "https://example.com/jobs/1",
                    "description": "Posted on 15/03/2024, apply now"
                },
                { "title": "No Link Inc" }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

#[test_context(TestDb)]
#[tokio::test]
async fn agent_op_dispatch_saves_and_lists_jobs(ctx: &TestDb) {
    let base = spawn_server(ctx).await;
    let client = reqwest::Client::new();

    let report = save_jobs_via_op(&base, &client).await;
    assert_eq!(report["inserted"], 1);
    assert_eq!(report["duplicates"], 0);

    let body: Value = client
        .get(format!("{base}/api/jobs"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["jobs"][0]["company"], "TechCorp");
    assert_eq!(body["jobs"][0]["scraped_date"], "2024-03-15");
}

#[test_context(TestDb)]
#[tokio::test]
async fn unknown_action_is_a_validation_error(ctx: &TestDb) {
    let base = spawn_server(ctx).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/agent/op"))
        .json(&json!({ "action": "drop_everything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[test_context(TestDb)]
#[tokio::test]
async fn artifact_roundtrip_over_http(ctx: &TestDb) {
    let base = spawn_server(ctx).await;
    let client = reqwest::Client::new();

    save_jobs_via_op(&base, &client).await;
    let jobs: Value = client
        .get(format!("{base}/api/jobs/unprocessed"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let job_id = jobs["jobs"][0]["job_id"].as_i64().unwrap();

    let payload = b"%PDF-1.4 generated cv";
    let saved: Value = client
        .post(format!("{base}/api/agent/op"))
        .json(&json!({
            "action": "save_cv",
            "job_id": job_id,
            "artifact_base64": BASE64.encode(payload),
            "match_score": 91
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let cv_id = saved["cv_id"].as_i64().unwrap();

    let download = client
        .get(format!("{base}/api/artifacts/{cv_id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(download.status(), 200);
    assert_eq!(
        download.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    assert_eq!(download.bytes().await.unwrap().as_ref(), payload);

    let stats: Value = client
        .get(format!("{base}/api/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["total_jobs"], 1);
    assert_eq!(stats["processed_jobs"], 1);
    assert_eq!(stats["artifacts"], 1);
}

#[test_context(TestDb)]
#[tokio::test]
async fn missing_artifact_download_is_404(ctx: &TestDb) {
    let base = spawn_server(ctx).await;
    let client = reqwest::Client::new();

    // Heal the schema first so the read path hits an empty table.
    save_jobs_via_op(&base, &client).await;

    let response = client
        .get(format!("{base}/api/artifacts/12345/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[test_context(TestDb)]
#[tokio::test]
async fn pipeline_start_and_status_roundtrip(ctx: &TestDb) {
    let base = spawn_server(ctx).await;
    let client = reqwest::Client::new();

    let idle: Value = client
        .get(format!("{base}/api/pipeline/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(idle["status"], "idle");

    let started: Value = client
        .post(format!("{base}/api/pipeline/start"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["accepted"], true);
    assert_eq!(started["status"], "running");

    // The stub agent returns immediately; poll until the run settles.
    let mut status = Value::Null;
    for _ in 0..50 {
        status = client
            .get(format!("{base}/api/pipeline/status"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status["status"] != "running" {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(status["status"], "completed");
    assert_eq!(status["jobs_found"], 2);
    assert_eq!(status["artifacts_created"], 1);
}

#[test_context(TestDb)]
#[tokio::test]
async fn health_reports_database_ok(ctx: &TestDb) {
    let base = spawn_server(ctx).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}
