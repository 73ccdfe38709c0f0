use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// What the external agent reports back after a run.
///
/// Counts are best-effort: the agent may not produce reliable numbers, in
/// which case the fields stay absent and the status counters read zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentReport {
    #[serde(default)]
    pub jobs_found: Option<u32>,
    #[serde(default)]
    pub artifacts_created: Option<u32>,
}

/// The external reasoning agent, treated as a black box.
///
/// A full run discovers jobs and generates CV artifacts; the artifact-only
/// run generates artifacts for already-stored unprocessed jobs.
#[async_trait]
pub trait PipelineAgent: Send + Sync {
    async fn run_full(&self) -> Result<AgentReport>;

    async fn run_artifact_only(&self) -> Result<AgentReport>;
}

/// HTTP client for an agent running as a separate service.
pub struct HttpPipelineAgent {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPipelineAgent {
    /// Create a new agent client.
    ///
    /// No timeout is set on purpose: a pipeline run takes minutes and
    /// bounding it is the agent's own responsibility.
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    async fn run(&self, mode: &str) -> Result<AgentReport> {
        debug!(mode, "invoking pipeline agent");

        let response = self
            .client
            .post(format!("{}/run", self.base_url))
            .json(&serde_json::json!({ "mode": mode }))
            .send()
            .await
            .context("Failed to reach pipeline agent")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("agent run failed with {status}: {body}");
        }

        // Counts are optional; an unparseable body is treated as no counts.
        Ok(response.json::<AgentReport>().await.unwrap_or_default())
    }
}

#[async_trait]
impl PipelineAgent for HttpPipelineAgent {
    async fn run_full(&self) -> Result<AgentReport> {
        self.run("full").await
    }

    async fn run_artifact_only(&self) -> Result<AgentReport> {
        self.run("artifact_only").await
    }
}
