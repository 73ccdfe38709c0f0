use axum::extract::{Extension, Path};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::common::Error;
use crate::domains::artifacts::ArtifactSummary;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct ArtifactListResponse {
    pub artifacts: Vec<ArtifactSummary>,
    pub total: usize,
}

/// List stored artifacts joined with their owning job, newest first.
pub async fn list_artifacts_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ArtifactListResponse>, Error> {
    let artifacts = state.artifacts.list_artifacts().await?;
    Ok(Json(ArtifactListResponse {
        total: artifacts.len(),
        artifacts,
    }))
}

/// Deliver one artifact's bytes as a downloadable PDF. 404 when absent.
pub async fn download_artifact_handler(
    Extension(state): Extension<AppState>,
    Path(cv_id): Path<i64>,
) -> Result<Response, Error> {
    let bytes = state.artifacts.artifact_bytes(cv_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=optimized_cv_{cv_id}.pdf"),
            ),
        ],
        bytes,
    )
        .into_response())
}
