use axum::extract::{Extension, Query};
use axum::Json;
use serde::Serialize;

use crate::common::Error;
use crate::domains::jobs::{Job, JobFilter};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<Job>,
    pub total: usize,
}

/// List jobs, newest first, with optional company/title/source filters.
pub async fn list_jobs_handler(
    Extension(state): Extension<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<Json<JobListResponse>, Error> {
    let jobs = state.jobs.list_jobs(&filter).await?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}

/// Jobs still waiting for an artifact, most recently scraped first.
pub async fn unprocessed_jobs_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<JobListResponse>, Error> {
    let jobs = state.jobs.unprocessed_jobs().await?;
    Ok(Json(JobListResponse {
        total: jobs.len(),
        jobs,
    }))
}
