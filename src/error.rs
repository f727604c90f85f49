//! Error taxonomy for the extraction pipeline.
//!
//! Every error here is terminal for the run that raised it: there is no
//! retry and no partial output. Malformed log lines are a deliberate
//! leniency handled inside the parser and never surface as errors.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The repository could not be obtained or refreshed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to prepare cache directory {path:?}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// The cached clone has diverged from origin. The cache never rewrites
    /// history; delete the cached directory to recover.
    #[error("cached clone cannot be fast-forwarded to origin")]
    NonFastForward,
}

/// The history command failed to execute or returned unreadable output.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to spawn git log: {0}")]
    Spawn(#[source] io::Error),

    #[error("git log exited with {status}: {stderr}")]
    Command { status: ExitStatus, stderr: String },
}

/// Top-level error for a single repository run.
#[derive(Debug, Error)]
pub enum HistreeError {
    #[error("repository fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("history extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("failed to encode report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write report to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("worker task failed: {0}")]
    Worker(String),
}
