//! Report assembly and serialization.
//!
//! Combines the aggregated statistics and the reconstructed tree into the
//! output record, and writes it as one pretty-printed JSON file per
//! repository.

use crate::error::HistreeError;
use crate::history::History;
use crate::repo::locator;
use crate::stats;
use crate::tree::TreeBuilder;
use crate::types::{Metadata, RepoData};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Assemble the output record for one repository.
///
/// Pure combination: statistics and the tree are both computed from the
/// extracted history; nothing here can fail.
pub fn build(history: &History, repo_url: &str) -> RepoData {
    let summary = stats::aggregate(&history.commits);
    let mut builder = TreeBuilder::new();
    builder.replay(&history.actions);

    RepoData {
        metadata: Metadata {
            repo_name: locator::repo_key(repo_url),
            repo_url: repo_url.to_string(),
            first_commit_date: summary.first_commit_date,
            last_commit_date: summary.last_commit_date,
            total_commits: summary.total_commits,
            authors: summary.authors,
        },
        file_actions: history.actions.clone(),
        final_tree: builder.snapshot(),
    }
}

/// Write the report under `output_dir`, named by the repository key.
/// Returns the written path.
pub fn write(data: &RepoData, output_dir: &Path) -> Result<PathBuf, HistreeError> {
    fs::create_dir_all(output_dir).map_err(|source| HistreeError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(format!("{}.json", data.metadata.repo_name));
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&path, json).map_err(|source| HistreeError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "report written");
    Ok(path)
}
