pub mod job;

pub use job::{Job, JobFilter, PreparedJob, RawJob, SaveReport};
