//! Wire data model for the history report.
//!
//! Field names mirror the JSON consumed by the visualization frontend.
//! Timestamps are integer seconds since the Unix epoch.

use serde::{Deserialize, Serialize};

/// Change kind for one file touched by one commit.
///
/// Rename and copy records never reach this type: rename detection is
/// disabled at extraction time and any other change code is dropped by the
/// parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    #[serde(rename = "A")]
    Added,
    #[serde(rename = "M")]
    Modified,
    #[serde(rename = "D")]
    Deleted,
}

/// One file change attributed to one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub path: String,
    pub timestamp: i64,
    pub author: String,
    /// Empty in compact extraction mode.
    pub commit_hash: String,
    /// Empty in compact extraction mode.
    pub commit_message: String,
}

/// Per-author commit statistics, keyed by display name (exact match, no
/// deduplication across spellings or emails).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    /// Present in the wire format but never populated; author identity is
    /// display-name only.
    pub email: String,
    pub first_commit: i64,
    pub last_commit: i64,
    pub total_commits: usize,
}

/// Repository-level metadata attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub repo_name: String,
    pub repo_url: String,
    pub first_commit_date: i64,
    pub last_commit_date: i64,
    pub total_commits: usize,
    pub authors: Vec<Author>,
}

/// Node kind in the emitted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "directory")]
    Directory,
}

/// One node of the emitted (live) tree.
///
/// This is a value snapshot: the reconstruction engine keeps its own
/// working state and copies into this shape at emission time, so output is
/// never aliased to mutable engine internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
    pub last_modified: i64,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// The full output record for one processed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoData {
    pub metadata: Metadata,
    /// The complete extracted event list, deletes included, in the log's
    /// native newest-first order.
    pub file_actions: Vec<FileAction>,
    pub final_tree: Vec<FileNode>,
}
