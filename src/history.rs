//! History extraction.
//!
//! Runs the version-control log against a local clone and parses its raw
//! output into typed commit and file-change records. The line grammar is
//! lenient: malformed change lines and unrecognized change codes are
//! dropped, never fatal. Only the log invocation itself can fail.

use crate::error::ExtractError;
use crate::types::{ActionKind, FileAction};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Commit header format requested from the log command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Author name and timestamp only; hash and message left empty.
    #[default]
    Compact,
    /// Author name, commit hash and subject on the header line, joined by
    /// the ASCII unit separator.
    Detailed,
}

impl LogFormat {
    fn pretty(self) -> &'static str {
        match self {
            LogFormat::Compact => "--pretty=format:user:%aN%n%ct",
            LogFormat::Detailed => "--pretty=format:user:%aN%x1f%H%x1f%s%n%ct",
        }
    }
}

/// One commit parsed from the log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub author: String,
    /// Set when the header's timestamp line arrived. A header with no
    /// timestamp still counts as a commit boundary, but contributes
    /// nothing to author statistics or the repository time span.
    pub timestamp: Option<i64>,
    pub hash: String,
    pub message: String,
}

/// Full parse product: commit boundaries plus the flat action sequence, in
/// the log's native newest-first order.
#[derive(Debug, Clone, Default)]
pub struct History {
    pub commits: Vec<CommitInfo>,
    pub actions: Vec<FileAction>,
}

/// Run the log command against a local clone and return its raw output.
///
/// Requests newest-first ordering, raw per-file change records, UTF-8
/// encoding, no rename detection and no signature output. A spawn failure
/// or non-zero exit is terminal; no partial event sequence is produced.
pub fn read_log(repo_dir: &Path, format: LogFormat) -> Result<String, ExtractError> {
    let output = Command::new("git")
        .arg("log")
        .arg(format.pretty())
        .args(["--raw", "--encoding=UTF-8", "--no-renames", "--no-show-signature"])
        .current_dir(repo_dir)
        .output()
        .map_err(ExtractError::Spawn)?;

    if !output.status.success() {
        return Err(ExtractError::Command {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse raw log text into commit records and file actions.
///
/// Grammar, per line:
/// - `user:<header>` starts a commit. The header carries the author name,
///   plus hash and subject in detailed mode.
/// - A bare integer line is the commit timestamp; it applies to all change
///   lines until the next header.
/// - A `:`-prefixed line is a raw change record: at least six
///   whitespace-separated fields, change code fifth, path sixth. Codes
///   other than A/M/D and paths under the VCS metadata directory are
///   dropped.
/// - Anything else is ignored.
pub fn parse_log(text: &str) -> History {
    let mut history = History::default();
    let mut author = String::new();
    let mut hash = String::new();
    let mut message = String::new();
    let mut timestamp: i64 = 0;

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("user:") {
            let mut fields = header.split('\x1f');
            author = fields.next().unwrap_or_default().to_string();
            hash = fields.next().unwrap_or_default().to_string();
            message = fields.next().unwrap_or_default().to_string();
            history.commits.push(CommitInfo {
                author: author.clone(),
                timestamp: None,
                hash: hash.clone(),
                message: message.clone(),
            });
            continue;
        }

        if line.starts_with(':') {
            if let Some(action) = parse_change_line(line, timestamp, &author, &hash, &message) {
                history.actions.push(action);
            }
            continue;
        }

        if let Ok(parsed) = line.parse::<i64>() {
            timestamp = parsed;
            if let Some(commit) = history.commits.last_mut() {
                if commit.timestamp.is_none() {
                    commit.timestamp = Some(parsed);
                }
            }
        }
    }

    history
}

fn parse_change_line(
    line: &str,
    timestamp: i64,
    author: &str,
    hash: &str,
    message: &str,
) -> Option<FileAction> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        debug!(line, "skipping malformed change line");
        return None;
    }

    let kind = match fields[4] {
        "A" => ActionKind::Added,
        "M" => ActionKind::Modified,
        "D" => ActionKind::Deleted,
        other => {
            debug!(code = other, "skipping unsupported change code");
            return None;
        }
    };

    let path = fields[5];
    if path.starts_with(".git/") {
        return None;
    }

    Some(FileAction {
        kind,
        path: path.to_string(),
        timestamp,
        author: author.to_string(),
        commit_hash: hash.to_string(),
        commit_message: message.to_string(),
    })
}
