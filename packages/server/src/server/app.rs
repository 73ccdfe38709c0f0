//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::common::RetryPolicy;
use crate::domains::artifacts::ArtifactStore;
use crate::domains::jobs::JobStore;
use crate::kernel::{ConnectionProvider, PipelineAgent, PipelineRunner};
use crate::server::routes::{
    agent_op_handler, download_artifact_handler, health_handler, list_artifacts_handler,
    list_jobs_handler, pipeline_status_handler, start_artifact_pipeline_handler,
    start_pipeline_handler, stats_handler, unprocessed_jobs_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<ConnectionProvider>,
    pub jobs: JobStore,
    pub artifacts: ArtifactStore,
    pub runner: Arc<PipelineRunner>,
}

/// Build the Axum application router.
///
/// Spawns the pipeline runner's worker task as a side effect, so this must
/// be called from within a Tokio runtime.
pub fn build_app(
    provider: Arc<ConnectionProvider>,
    agent: Arc<dyn PipelineAgent>,
    retry: RetryPolicy,
) -> Router {
    let state = AppState {
        jobs: JobStore::new(provider.clone(), retry),
        artifacts: ArtifactStore::new(provider.clone(), retry),
        runner: Arc::new(PipelineRunner::new(agent)),
        provider,
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        // Read surface for the web layer
        .route("/api/jobs", get(list_jobs_handler))
        .route("/api/jobs/unprocessed", get(unprocessed_jobs_handler))
        .route("/api/artifacts", get(list_artifacts_handler))
        .route("/api/artifacts/:cv_id/download", get(download_artifact_handler))
        .route("/api/stats", get(stats_handler))
        // Pipeline control
        .route("/api/pipeline/start", post(start_pipeline_handler))
        .route(
            "/api/pipeline/start-artifacts",
            post(start_artifact_pipeline_handler),
        )
        .route("/api/pipeline/status", get(pipeline_status_handler))
        // Agent-facing operation dispatch
        .route("/api/agent/op", post(agent_op_handler))
        // Health check
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
