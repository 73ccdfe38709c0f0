//! Domain modules - jobs, CV artifacts, and the agent operation surface.

pub mod artifacts;
pub mod jobs;
pub mod ops;
