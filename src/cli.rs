//! Command-line interface.
//!
//! One repository per invocation: fetch or refresh the clone, extract its
//! history, reconstruct the tree and write the report.

use crate::config::{ConfigLoader, HistreeConfig};
use crate::error::HistreeError;
use crate::history::{self, LogFormat};
use crate::repo::RepoCache;
use crate::report;
use crate::types::RepoData;
use clap::Parser;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::PathBuf;
use tracing::info;

/// Histree - rebuild a repository's file tree and author statistics from
/// its commit history
#[derive(Parser)]
#[command(name = "histree")]
#[command(about = "Rebuild a repository's file tree and author statistics from its commit history")]
pub struct Cli {
    /// Repository URL to process
    pub repo_url: String,

    /// Root directory for cached clones
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Include commit hash and subject in extracted events
    #[arg(long)]
    pub details: bool,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration: loaded sources with CLI flags
    /// applied on top.
    pub fn effective_config(&self) -> Result<HistreeConfig, HistreeError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
        .map_err(|e| HistreeError::Config(e.to_string()))?;

        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.details {
            config.details = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }

        Ok(config)
    }
}

/// Run the full pipeline for one repository. Returns the assembled report
/// and the path it was written to.
pub fn run(cli: &Cli, config: &HistreeConfig) -> Result<(RepoData, PathBuf), HistreeError> {
    let cache = RepoCache::new(&config.cache_dir);

    info!(url = %cli.repo_url, "processing repository");
    let clone_dir = cache.open_or_update(&cli.repo_url)?;

    let format = if config.details {
        LogFormat::Detailed
    } else {
        LogFormat::Compact
    };
    let raw = history::read_log(&clone_dir, format)?;
    let parsed = history::parse_log(&raw);
    info!(
        commits = parsed.commits.len(),
        actions = parsed.actions.len(),
        "history extracted"
    );

    let data = report::build(&parsed, &cli.repo_url);
    let path = report::write(&data, &config.output_dir)?;
    Ok((data, path))
}

/// Render the per-author summary printed after a successful run.
pub fn summary_table(data: &RepoData) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Author", "Commits", "First", "Last"]);

    let mut authors = data.metadata.authors.clone();
    authors.sort_by(|a, b| {
        b.total_commits
            .cmp(&a.total_commits)
            .then_with(|| a.name.cmp(&b.name))
    });
    for author in &authors {
        table.add_row(vec![
            author.name.clone(),
            author.total_commits.to_string(),
            format_date(author.first_commit),
            format_date(author.last_commit),
        ]);
    }
    table
}

fn format_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Author, Metadata};

    #[test]
    fn cli_flags_override_loaded_config() {
        let cli = Cli::parse_from([
            "histree",
            "https://github.com/acme/widget",
            "--cache-dir",
            "/tmp/cc",
            "--details",
            "--log-level",
            "debug",
        ]);
        let config = cli.effective_config().unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cc"));
        assert!(config.details);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn summary_table_orders_authors_by_commit_count() {
        let data = RepoData {
            metadata: Metadata {
                repo_name: "acme_widget".to_string(),
                repo_url: "https://github.com/acme/widget".to_string(),
                first_commit_date: 0,
                last_commit_date: 0,
                total_commits: 3,
                authors: vec![
                    Author {
                        name: "bob".to_string(),
                        email: String::new(),
                        first_commit: 20,
                        last_commit: 20,
                        total_commits: 1,
                    },
                    Author {
                        name: "alice".to_string(),
                        email: String::new(),
                        first_commit: 10,
                        last_commit: 30,
                        total_commits: 2,
                    },
                ],
            },
            file_actions: Vec::new(),
            final_tree: Vec::new(),
        };

        let rendered = summary_table(&data).to_string();
        let alice = rendered.find("alice").unwrap();
        let bob = rendered.find("bob").unwrap();
        assert!(alice < bob);
    }

    #[test]
    fn format_date_renders_epoch_seconds() {
        assert_eq!(format_date(0), "1970-01-01");
    }
}
