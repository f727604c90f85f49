//! Commit and author aggregation.
//!
//! Streaming fold over commit boundaries producing per-author first/last
//! seen timestamps and counts, plus the repository's overall time span.

use crate::history::CommitInfo;
use crate::types::Author;
use std::collections::HashMap;

/// Aggregate statistics over the full commit sequence.
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    /// Per-author statistics, in no guaranteed order.
    pub authors: Vec<Author>,
    pub first_commit_date: i64,
    pub last_commit_date: i64,
    pub total_commits: usize,
}

/// Fold the commit sequence into summary statistics.
///
/// Every commit header counts toward the total, including commits that
/// touched no files. Author identity is the display name, matched exactly.
/// Commits without a timestamp are counted but contribute nothing to
/// per-author or span statistics.
pub fn aggregate(commits: &[CommitInfo]) -> StatsSummary {
    let mut authors: HashMap<&str, Author> = HashMap::new();
    let mut first = 0i64;
    let mut last = 0i64;

    for commit in commits {
        let Some(timestamp) = commit.timestamp else {
            continue;
        };

        if first == 0 || timestamp < first {
            first = timestamp;
        }
        if timestamp > last {
            last = timestamp;
        }

        let entry = authors
            .entry(commit.author.as_str())
            .or_insert_with(|| Author {
                name: commit.author.clone(),
                email: String::new(),
                first_commit: timestamp,
                last_commit: timestamp,
                total_commits: 0,
            });
        entry.total_commits += 1;
        if timestamp < entry.first_commit {
            entry.first_commit = timestamp;
        }
        if timestamp > entry.last_commit {
            entry.last_commit = timestamp;
        }
    }

    StatsSummary {
        authors: authors.into_values().collect(),
        first_commit_date: first,
        last_commit_date: last,
        total_commits: commits.len(),
    }
}
