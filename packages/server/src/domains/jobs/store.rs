use std::sync::Arc;

use chrono::Utc;
use sqlx::Connection;
use tracing::{debug, info};

use crate::common::{Error, RetryPolicy};
use crate::kernel::schema::ensure_schema;
use crate::kernel::ConnectionProvider;

use super::models::{Job, JobFilter, RawJob, SaveReport};

/// Deduplicated batch ingestion and query of discovered jobs.
#[derive(Clone)]
pub struct JobStore {
    provider: Arc<ConnectionProvider>,
    retry: RetryPolicy,
}

impl JobStore {
    pub fn new(provider: Arc<ConnectionProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Persist a batch of agent-discovered jobs.
    ///
    /// Records missing required fields are dropped before reaching the
    /// database. The batch is written in one transaction with an
    /// insert-or-ignore keyed on `(company, title, link)`: pre-existing
    /// rows are left untouched and counted as duplicates.
    pub async fn save_jobs(&self, batch: Vec<RawJob>) -> Result<SaveReport, Error> {
        let today = Utc::now().date_naive();
        let prepared: Vec<_> = batch
            .into_iter()
            .filter_map(|raw| raw.prepare(today))
            .collect();

        if prepared.is_empty() {
            debug!("no valid jobs in batch after preparation");
            return Ok(SaveReport::default());
        }

        let mut conn = self.provider.open_with_retry(&self.retry).await?;
        ensure_schema(&mut conn).await?;

        let mut tx = conn.begin().await.map_err(Error::Store)?;
        let mut inserted: u32 = 0;

        for job in &prepared {
            let result = sqlx::query(
                r#"
                INSERT INTO jobs (title, company, link, descript, source, scraped_date)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (company, title, link) DO NOTHING
                "#,
            )
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.link)
            .bind(&job.descript)
            .bind(&job.source)
            .bind(job.scraped_date)
            .execute(&mut *tx)
            .await
            .map_err(Error::Store)?;

            inserted += result.rows_affected() as u32;
        }

        tx.commit().await.map_err(Error::Store)?;

        let report = SaveReport {
            inserted,
            duplicates: prepared.len() as u32 - inserted,
        };
        info!(
            inserted = report.inserted,
            duplicates = report.duplicates,
            "saved job batch"
        );
        Ok(report)
    }

    /// All jobs not yet processed, most recently scraped first.
    pub async fn unprocessed_jobs(&self) -> Result<Vec<Job>, Error> {
        let mut conn = self.provider.open().await?;
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE is_processed = FALSE
            ORDER BY scraped_date DESC
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(Error::Store)
    }

    /// Listing for the web layer, newest first, with optional substring
    /// filters on company, title, and source.
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, Error> {
        let mut conn = self.provider.open().await?;
        sqlx::query_as::<_, Job>(
            r#"
            SELECT * FROM jobs
            WHERE ($1::TEXT IS NULL OR company ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL OR title ILIKE '%' || $2 || '%')
              AND ($3::TEXT IS NULL OR source ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filter.company)
        .bind(&filter.title)
        .bind(&filter.source)
        .fetch_all(&mut conn)
        .await
        .map_err(Error::Store)
    }

    /// Basic job/artifact counts for the stats endpoint.
    pub async fn stats(&self) -> Result<StoreStats, Error> {
        let mut conn = self.provider.open().await?;
        let (total_jobs, processed_jobs, artifacts): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM jobs),
                (SELECT COUNT(*) FROM jobs WHERE is_processed),
                (SELECT COUNT(*) FROM artifacts)
            "#,
        )
        .fetch_one(&mut conn)
        .await
        .map_err(Error::Store)?;

        Ok(StoreStats {
            total_jobs,
            processed_jobs,
            artifacts,
        })
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StoreStats {
    pub total_jobs: i64,
    pub processed_jobs: i64,
    pub artifacts: i64,
}
