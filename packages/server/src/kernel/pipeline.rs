//! Single-flight background execution of the pipeline agent.
//!
//! The runner owns one dedicated worker task fed by a bounded channel of
//! capacity 1. That worker slot, not the status flag, is what enforces
//! "at most one run at a time" at the process level: `start` hands the run
//! to the channel while still holding the state lock, so two callers can
//! never both observe `Idle` and both schedule work.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

use super::agent::PipelineAgent;

/// Which agent entry point a run invokes. The state machine and locking
/// discipline are identical for both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Full,
    ArtifactOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// In-memory record of the current (or most recent) pipeline run.
#[derive(Debug)]
struct PipelineRun {
    run_id: Option<Uuid>,
    state: RunState,
    jobs_found: u32,
    artifacts_created: u32,
    error: Option<String>,
}

impl PipelineRun {
    fn idle() -> Self {
        Self {
            run_id: None,
            state: RunState::Idle,
            jobs_found: 0,
            artifacts_created: 0,
            error: None,
        }
    }

    /// Fresh counters and error detail for a new run.
    fn reset(&mut self, run_id: Uuid) {
        self.run_id = Some(run_id);
        self.state = RunState::Running;
        self.jobs_found = 0;
        self.artifacts_created = 0;
        self.error = None;
    }

    fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            run_id: self.run_id,
            state: self.state,
            jobs_found: self.jobs_found,
            artifacts_created: self.artifacts_created,
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view of the run state, safe to hand to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    pub state: RunState,
    pub jobs_found: u32,
    pub artifacts_created: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSnapshot {
    /// Human-readable status line for API responses.
    pub fn message(&self) -> String {
        match self.state {
            RunState::Idle => "Pipeline is ready to start".to_string(),
            RunState::Running => "Pipeline is processing jobs and creating CVs".to_string(),
            RunState::Completed => format!(
                "Pipeline completed. Found {} jobs, created {} CVs",
                self.jobs_found, self.artifacts_created
            ),
            RunState::Failed => format!(
                "Pipeline failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Result of a start request.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    /// False when a run was already in flight and the request was absorbed.
    pub accepted: bool,
    pub snapshot: RunSnapshot,
}

/// Finite-state tracker for pipeline execution.
///
/// All reads and writes of the run record go through one mutex, which is
/// never held across the agent invocation itself - only across the state
/// transitions before and after it.
pub struct PipelineRunner {
    run: Arc<Mutex<PipelineRun>>,
    tx: mpsc::Sender<PipelineKind>,
}

impl PipelineRunner {
    /// Create the runner and spawn its worker task.
    pub fn new(agent: Arc<dyn PipelineAgent>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let run = Arc::new(Mutex::new(PipelineRun::idle()));

        tokio::spawn(worker_loop(rx, run.clone(), agent));

        Self { run, tx }
    }

    /// Request a pipeline run.
    ///
    /// Starting while a run is in flight is a no-op that reports the
    /// existing `Running` state, not an error. Otherwise the counters are
    /// reset and the run is handed to the worker before the state lock is
    /// released.
    pub async fn start(&self, kind: PipelineKind) -> StartOutcome {
        let mut run = self.run.lock().await;

        if run.state == RunState::Running {
            return StartOutcome {
                accepted: false,
                snapshot: run.snapshot(),
            };
        }

        let run_id = Uuid::new_v4();
        run.reset(run_id);

        // Capacity 1 and the Running guard above make this send succeed
        // whenever the worker task is alive.
        if self.tx.try_send(kind).is_err() {
            run.state = RunState::Failed;
            run.error = Some("pipeline worker is unavailable".to_string());
            error!(run_id = %run_id, "failed to hand run to worker");
            return StartOutcome {
                accepted: false,
                snapshot: run.snapshot(),
            };
        }

        info!(run_id = %run_id, kind = ?kind, "pipeline run started");
        StartOutcome {
            accepted: true,
            snapshot: run.snapshot(),
        }
    }

    /// Snapshot of the current state. Never blocks on the in-flight run.
    pub async fn status(&self) -> RunSnapshot {
        self.run.lock().await.snapshot()
    }
}

async fn worker_loop(
    mut rx: mpsc::Receiver<PipelineKind>,
    run: Arc<Mutex<PipelineRun>>,
    agent: Arc<dyn PipelineAgent>,
) {
    while let Some(kind) = rx.recv().await {
        // The long agent call happens without the lock held.
        let result = match kind {
            PipelineKind::Full => agent.run_full().await,
            PipelineKind::ArtifactOnly => agent.run_artifact_only().await,
        };

        let mut run = run.lock().await;
        match result {
            Ok(report) => {
                run.state = RunState::Completed;
                run.jobs_found = report.jobs_found.unwrap_or(0);
                run.artifacts_created = report.artifacts_created.unwrap_or(0);
                info!(
                    run_id = ?run.run_id,
                    jobs_found = run.jobs_found,
                    artifacts_created = run.artifacts_created,
                    "pipeline run completed"
                );
            }
            Err(e) => {
                run.state = RunState::Failed;
                run.error = Some(e.to_string());
                error!(run_id = ?run.run_id, error = %e, "pipeline run failed");
            }
        }
    }
}
