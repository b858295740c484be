//! Git remote inspection: repository identity and default branch.

use anyhow::{bail, Result};
use git2::Repository;

/// Where a remote points: host plus repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    /// Host name without user or port, e.g. `github.com`.
    pub host: String,
    /// Repository path without leading slash or `.git`, e.g. `owner/repo`
    /// or `group/subgroup/project`.
    pub path: String,
}

impl RemoteLocation {
    /// Parses SSH (`git@host:path.git`, `ssh://git@host[:port]/path.git`)
    /// and HTTP(S) remote URLs.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();

        let (host, path) = if uri.contains("://") {
            let parsed = url::Url::parse(uri)
                .map_err(|e| anyhow::anyhow!("Invalid remote URL '{uri}': {e}"))?;
            let host = parsed
                .host_str()
                .ok_or_else(|| anyhow::anyhow!("Remote URL '{uri}' has no host"))?
                .to_string();
            (host, parsed.path().to_string())
        } else if let Some((user_host, path)) = uri.split_once(':') {
            // scp-like syntax: [user@]host:path
            let host = user_host
                .rsplit_once('@')
                .map_or(user_host, |(_, host)| host)
                .to_string();
            (host, path.to_string())
        } else {
            bail!("Unsupported remote URL '{uri}'");
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path).to_string();

        if host.is_empty() || path.is_empty() || !path.contains('/') {
            bail!("Could not determine repository path from remote URL '{uri}'");
        }

        Ok(Self { host, path })
    }
}

/// Detects the default branch of a remote from its local refs.
///
/// Tries `refs/remotes/{remote}/HEAD` first, then common branch names.
pub fn detect_default_branch(repo: &Repository, remote: &str) -> Option<String> {
    let head_ref_name = format!("refs/remotes/{remote}/HEAD");
    if let Ok(head_ref) = repo.find_reference(&head_ref_name) {
        if let Some(target) = head_ref.symbolic_target() {
            if let Some(branch) = target.strip_prefix(&format!("refs/remotes/{remote}/")) {
                return Some(branch.to_string());
            }
        }
    }

    ["main", "master", "develop"]
        .iter()
        .find(|name| {
            repo.find_reference(&format!("refs/remotes/{remote}/{name}"))
                .is_ok()
        })
        .map(|name| (*name).to_string())
}
