pub mod models;
pub mod posting_date;
pub mod store;

pub use models::{Job, JobFilter, RawJob, SaveReport};
pub use store::{JobStore, StoreStats};
