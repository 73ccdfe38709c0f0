pub mod models;
pub mod store;

pub use models::ArtifactSummary;
pub use store::ArtifactStore;
