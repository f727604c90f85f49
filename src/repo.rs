//! Local repository cache.
//!
//! Keeps one clone per repository under a cache root, keyed by the derived
//! locator name. An existing clone is refreshed with a fetch plus
//! fast-forward of the checked-out branch; a missing one is cloned fresh.

pub mod locator;

use crate::error::FetchError;
use git2::Repository;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk clone cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct RepoCache {
    root: PathBuf,
}

impl RepoCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given repository URL caches to.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(locator::repo_key(url))
    }

    /// Open the cached clone for `url`, refreshing it from origin, or
    /// clone it fresh if absent. Returns the clone's directory.
    pub fn open_or_update(&self, url: &str) -> Result<PathBuf, FetchError> {
        std::fs::create_dir_all(&self.root).map_err(|source| FetchError::CacheDir {
            path: self.root.clone(),
            source,
        })?;

        let path = self.path_for(url);
        if path.exists() {
            info!(path = %path.display(), "updating cached clone");
            let repo = Repository::open(&path)?;
            fast_forward(&repo)?;
        } else {
            info!(url, path = %path.display(), "cloning repository");
            Repository::clone(url, &path)?;
        }
        Ok(path)
    }
}

/// Fetch origin and fast-forward the checked-out branch. Already up to
/// date is success; a diverged clone is refused rather than rewritten.
fn fast_forward(repo: &Repository) -> Result<(), FetchError> {
    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[] as &[&str], None, None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        return Ok(());
    }
    if analysis.is_fast_forward() {
        let mut head = repo.head()?;
        head.set_target(fetch_commit.id(), "histree: fast-forward")?;
        repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
        return Ok(());
    }
    Err(FetchError::NonFastForward)
}
