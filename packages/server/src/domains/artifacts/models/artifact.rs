use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored CV artifact joined with a summary of its owning job.
///
/// Payload bytes are deliberately excluded; they are fetched one at a time
/// through the download path.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ArtifactSummary {
    pub cv_id: i64,
    pub job_id: i64,
    pub match_score: i32,
    pub created_at: DateTime<Utc>,
    pub job_title: String,
    pub company: String,
}
