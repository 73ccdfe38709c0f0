use std::str::FromStr;

use crate::common::Error;

/// Closed set of operations the external agent may dispatch.
///
/// Parsing tolerates casing and separator variants the agent has been seen
/// to emit ("Save jobs", "SAVE_JOBS", "save-jobs"); anything outside the
/// set is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    SaveJobs,
    GetUnprocessedJobs,
    SaveArtifact,
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        let normalized = action
            .trim()
            .to_lowercase()
            .replace([' ', '-'], "_");

        match normalized.as_str() {
            "save_jobs" => Ok(Self::SaveJobs),
            "get_unprocessed_jobs" | "unprocessed_jobs" => Ok(Self::GetUnprocessedJobs),
            "save_artifact" | "save_cv" => Ok(Self::SaveArtifact),
            _ => Err(Error::Validation(format!("unknown action: {action}"))),
        }
    }
}
