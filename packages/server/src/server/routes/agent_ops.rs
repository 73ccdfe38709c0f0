//! Single dispatch endpoint for the external agent's persistence operations.

use axum::extract::Extension;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::Error;
use crate::domains::jobs::RawJob;
use crate::domains::ops::OpKind;
use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct OpEnvelope {
    pub action: String,
    #[serde(default)]
    pub jobs: Vec<RawJob>,
    pub job_id: Option<i64>,
    /// Artifact payload, base64-encoded for JSON transport.
    pub artifact_base64: Option<String>,
    pub match_score: Option<i32>,
}

/// Dispatch one agent operation.
///
/// The action name is parsed into the closed operation set; unknown actions
/// are rejected with a validation error before any I/O.
pub async fn agent_op_handler(
    Extension(state): Extension<AppState>,
    Json(envelope): Json<OpEnvelope>,
) -> Result<Json<Value>, Error> {
    let kind: OpKind = envelope.action.parse()?;

    match kind {
        OpKind::SaveJobs => {
            let report = state.jobs.save_jobs(envelope.jobs).await?;
            Ok(Json(json!({
                "inserted": report.inserted,
                "duplicates": report.duplicates,
            })))
        }
        OpKind::GetUnprocessedJobs => {
            let jobs = state.jobs.unprocessed_jobs().await?;
            let total = jobs.len();
            Ok(Json(json!({ "jobs": jobs, "total": total })))
        }
        OpKind::SaveArtifact => {
            let job_id = envelope
                .job_id
                .ok_or_else(|| Error::Validation("job_id is required".into()))?;
            let encoded = envelope
                .artifact_base64
                .ok_or_else(|| Error::Validation("artifact_base64 is required".into()))?;
            let match_score = envelope
                .match_score
                .ok_or_else(|| Error::Validation("match_score is required".into()))?;

            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| Error::Validation(format!("artifact_base64 is not valid: {e}")))?;

            let cv_id = state
                .artifacts
                .save_and_mark_processed(job_id, bytes, match_score)
                .await?;
            Ok(Json(json!({ "cv_id": cv_id })))
        }
    }
}
