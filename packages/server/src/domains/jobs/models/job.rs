use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::jobs::posting_date::extract_posting_date;

/// Producer tag recorded when the agent does not supply one.
const DEFAULT_SOURCE: &str = "agent";

/// A discovered job posting as stored.
///
/// Identified by a surrogate key; the `(company, title, link)` triple is
/// unique, so re-ingesting an identical posting is a no-op.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Job {
    pub job_id: i64,
    pub title: String,
    pub company: String,
    pub link: String,
    pub descript: Option<String>,
    pub source: Option<String>,
    pub scraped_date: NaiveDate,
    pub is_processed: bool,
    pub created_at: DateTime<Utc>,
}

/// A job record as produced by the agent, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RawJob {
    /// Validate and normalize for insertion.
    ///
    /// A record missing title, company, or link is silently dropped, not an
    /// error. The posting date is pulled from the description text when a
    /// recognizable token is present, otherwise it defaults to today.
    pub fn prepare(self, today: NaiveDate) -> Option<PreparedJob> {
        let title = non_empty(self.title)?;
        let company = non_empty(self.company)?;
        let link = non_empty(self.link)?;

        let scraped_date = self
            .description
            .as_deref()
            .and_then(extract_posting_date)
            .unwrap_or(today);

        Some(PreparedJob {
            title,
            company,
            link,
            descript: self.description,
            source: non_empty(self.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            scraped_date,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A validated job ready for the batch insert.
#[derive(Debug, Clone)]
pub struct PreparedJob {
    pub title: String,
    pub company: String,
    pub link: String,
    pub descript: Option<String>,
    pub source: String,
    pub scraped_date: NaiveDate,
}

/// Outcome of a batch save. Duplicates are a normal, silently-absorbed
/// outcome, reported only through the counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub inserted: u32,
    pub duplicates: u32,
}

/// Optional substring filters for the job listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub company: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
}
