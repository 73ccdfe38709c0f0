// Job pipeline server - core library
//
// This crate provides the persistence and execution-state layer for an
// agent-driven job application pipeline: deduplicated job ingestion,
// atomic CV artifact storage, and a single-flight background pipeline
// runner, plus the thin HTTP surface around them.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::Config;
