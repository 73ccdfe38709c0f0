pub mod agent_ops;
pub mod artifacts;
pub mod health;
pub mod jobs;
pub mod pipeline;
pub mod stats;

pub use agent_ops::agent_op_handler;
pub use artifacts::{download_artifact_handler, list_artifacts_handler};
pub use health::health_handler;
pub use jobs::{list_jobs_handler, unprocessed_jobs_handler};
pub use pipeline::{
    pipeline_status_handler, start_artifact_pipeline_handler, start_pipeline_handler,
};
pub use stats::stats_handler;
