pub mod artifact;

pub use artifact::ArtifactSummary;
