//! Kernel module - connections, schema, and pipeline execution.

pub mod agent;
pub mod db;
pub mod pipeline;
pub mod schema;

pub use agent::{AgentReport, HttpPipelineAgent, PipelineAgent};
pub use db::ConnectionProvider;
pub use pipeline::{PipelineKind, PipelineRunner, RunSnapshot, RunState, StartOutcome};
pub use schema::ensure_schema;
