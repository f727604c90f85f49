//! Repository locator utilities.

/// Derive the cache key and output base name for a repository URL.
///
/// Drops a trailing `.git`, then joins the last two path segments with an
/// underscore: `https://host/owner/repo.git` → `owner_repo`. A locator
/// with a single segment yields that segment alone.
pub fn repo_key(url: &str) -> String {
    let url = url.strip_suffix(".git").unwrap_or(url);
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return parts.last().copied().unwrap_or_default().to_string();
    }
    format!("{}_{}", parts[parts.len() - 2], parts[parts.len() - 1])
}
