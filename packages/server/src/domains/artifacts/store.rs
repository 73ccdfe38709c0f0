use std::sync::Arc;

use sqlx::Connection;
use tracing::info;

use crate::common::{Error, RetryPolicy};
use crate::kernel::schema::ensure_schema;
use crate::kernel::ConnectionProvider;

use super::models::ArtifactSummary;

/// Atomic "store artifact + mark source job processed" writes, and
/// artifact retrieval for delivery.
#[derive(Clone)]
pub struct ArtifactStore {
    provider: Arc<ConnectionProvider>,
    retry: RetryPolicy,
}

impl ArtifactStore {
    pub fn new(provider: Arc<ConnectionProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Store a generated CV and flip its job to processed, atomically.
    ///
    /// This is the only place two tables are mutated together. A
    /// half-applied write would leave a job invisible to both the pending
    /// and done views, so the artifact insert and the job update commit
    /// once, together, or not at all. A job id that matches no row rolls
    /// the artifact insert back and surfaces as not-found.
    pub async fn save_and_mark_processed(
        &self,
        job_id: i64,
        artifact_bytes: Vec<u8>,
        match_score: i32,
    ) -> Result<i64, Error> {
        if job_id <= 0 {
            return Err(Error::Validation("job_id must be positive".into()));
        }
        if artifact_bytes.is_empty() {
            return Err(Error::Validation("artifact payload is empty".into()));
        }
        if !(0..=100).contains(&match_score) {
            return Err(Error::Validation(format!(
                "match_score must be between 0 and 100, got {match_score}"
            )));
        }

        let mut conn = self.provider.open_with_retry(&self.retry).await?;
        ensure_schema(&mut conn).await?;

        let mut tx = conn.begin().await.map_err(Error::Store)?;

        let cv_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO artifacts (job_id, artifact_bytes, match_score)
            VALUES ($1, $2, $3)
            RETURNING cv_id
            "#,
        )
        .bind(job_id)
        .bind(&artifact_bytes)
        .bind(match_score)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            // The foreign key fires before the update gets a chance to.
            if is_foreign_key_violation(&e) {
                Error::NotFound(format!("job {job_id} does not exist"))
            } else {
                Error::Store(e)
            }
        })?;

        let updated = sqlx::query("UPDATE jobs SET is_processed = TRUE WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Store)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(Error::Store)?;
            return Err(Error::NotFound(format!("job {job_id} does not exist")));
        }

        tx.commit().await.map_err(Error::Store)?;

        info!(cv_id, job_id, match_score, "stored artifact and marked job processed");
        Ok(cv_id)
    }

    /// Fetch one artifact's payload for delivery.
    pub async fn artifact_bytes(&self, cv_id: i64) -> Result<Vec<u8>, Error> {
        let mut conn = self.provider.open().await?;
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT artifact_bytes FROM artifacts WHERE cv_id = $1")
                .bind(cv_id)
                .fetch_optional(&mut conn)
                .await
                .map_err(Error::Store)?;

        row.map(|(bytes,)| bytes)
            .ok_or_else(|| Error::NotFound(format!("artifact {cv_id} does not exist")))
    }

    /// Artifact listing joined with owning job summaries, newest first.
    pub async fn list_artifacts(&self) -> Result<Vec<ArtifactSummary>, Error> {
        let mut conn = self.provider.open().await?;
        sqlx::query_as::<_, ArtifactSummary>(
            r#"
            SELECT cv.cv_id, cv.job_id, cv.match_score, cv.created_at,
                   j.title AS job_title, j.company
            FROM artifacts cv
            JOIN jobs j ON j.job_id = cv.job_id
            ORDER BY cv.created_at DESC
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(Error::Store)
    }
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}
