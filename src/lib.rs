//! Histree: Commit-History Tree Reconstruction
//!
//! Rebuilds, from a repository's commit history, per-author statistics and
//! a snapshot of the final file tree annotated with each node's creation,
//! last-modification and deletion timestamps.

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod jobs;
pub mod logging;
pub mod repo;
pub mod report;
pub mod stats;
pub mod tree;
pub mod types;
