use sqlx::{Executor, PgConnection};
use tracing::info;

use crate::common::Error;

/// Idempotent schema-creation script for the two persisted tables.
///
/// The `(company, title, link)` uniqueness constraint is what makes
/// duplicate ingestion safe under concurrency: the storage engine, not an
/// application-level check-then-insert, serializes the dedup decision.
const CREATE_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    job_id          BIGSERIAL PRIMARY KEY,
    title           TEXT NOT NULL,
    company         TEXT NOT NULL,
    link            TEXT NOT NULL,
    descript        TEXT,
    source          TEXT,
    scraped_date    DATE NOT NULL DEFAULT CURRENT_DATE,
    is_processed    BOOLEAN NOT NULL DEFAULT FALSE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT jobs_company_title_link_key UNIQUE (company, title, link)
);

CREATE TABLE IF NOT EXISTS artifacts (
    cv_id           BIGSERIAL PRIMARY KEY,
    job_id          BIGINT NOT NULL REFERENCES jobs (job_id),
    artifact_bytes  BYTEA NOT NULL,
    match_score     INTEGER NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Verify that the `jobs` and `artifacts` tables exist, creating them when
/// either is missing.
///
/// Invoked at the start of every write path, which makes writes self-healing
/// on a fresh database without a separate migration step. Returns whether the
/// creation script had to run; failures abort the enclosing operation before
/// anything is committed.
pub async fn ensure_schema(conn: &mut PgConnection) -> Result<bool, Error> {
    let (jobs_exists, artifacts_exists): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS (SELECT FROM information_schema.tables
                    WHERE table_schema = current_schema() AND table_name = 'jobs'),
            EXISTS (SELECT FROM information_schema.tables
                    WHERE table_schema = current_schema() AND table_name = 'artifacts')
        "#,
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| Error::Schema(e.to_string()))?;

    if jobs_exists && artifacts_exists {
        return Ok(false);
    }

    info!(
        jobs_exists,
        artifacts_exists, "required tables missing, creating schema"
    );

    conn.execute(CREATE_TABLES_SQL)
        .await
        .map_err(|e| Error::Schema(e.to_string()))?;

    Ok(true)
}
