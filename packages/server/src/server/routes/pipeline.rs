use axum::extract::Extension;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::kernel::{PipelineKind, RunSnapshot, RunState};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct StartResponse {
    pub accepted: bool,
    pub status: RunState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub message: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: RunState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub jobs_found: u32,
    pub artifacts_created: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl From<RunSnapshot> for StatusResponse {
    fn from(snapshot: RunSnapshot) -> Self {
        let message = snapshot.message();
        Self {
            status: snapshot.state,
            run_id: snapshot.run_id,
            jobs_found: snapshot.jobs_found,
            artifacts_created: snapshot.artifacts_created,
            error: snapshot.error,
            message,
        }
    }
}

/// Start the full discover-and-generate pipeline in the background.
pub async fn start_pipeline_handler(
    Extension(state): Extension<AppState>,
) -> Json<StartResponse> {
    start(&state, PipelineKind::Full).await
}

/// Start artifact generation for already-stored unprocessed jobs.
pub async fn start_artifact_pipeline_handler(
    Extension(state): Extension<AppState>,
) -> Json<StartResponse> {
    start(&state, PipelineKind::ArtifactOnly).await
}

async fn start(state: &AppState, kind: PipelineKind) -> Json<StartResponse> {
    let outcome = state.runner.start(kind).await;
    let message = if outcome.accepted {
        "Pipeline run started".to_string()
    } else {
        "Pipeline is already running".to_string()
    };

    Json(StartResponse {
        accepted: outcome.accepted,
        status: outcome.snapshot.state,
        run_id: outcome.snapshot.run_id,
        message,
    })
}

/// Current pipeline execution status. Never blocks on an in-flight run.
pub async fn pipeline_status_handler(
    Extension(state): Extension<AppState>,
) -> Json<StatusResponse> {
    Json(state.runner.status().await.into())
}
