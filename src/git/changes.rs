//! Branch change context handed to the content generator.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::git::GitRepository;

/// Which parts of a branch's changes to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeScope {
    /// Include the unified diff.
    pub include_diff: bool,
    /// Include one line per commit.
    pub include_commits: bool,
    /// Include the changed-file list.
    pub include_file_list: bool,
}

impl ChangeScope {
    /// Everything.
    pub const fn all() -> Self {
        Self {
            include_diff: true,
            include_commits: true,
            include_file_list: true,
        }
    }
}

/// What a source branch changes relative to its target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchChanges {
    /// Unified diff from the merge base, when requested.
    pub diff: Option<String>,
    /// `"<short hash> <subject>"`, oldest first.
    pub commits: Vec<String>,
    /// Changed paths.
    pub files: Vec<String>,
}

/// Supplies branch changes for prompt construction.
pub trait ChangeSource: Send + Sync {
    /// Collects the changes `source_branch` brings into `target_branch`.
    fn collect(
        &self,
        source_branch: &str,
        target_branch: &str,
        scope: ChangeScope,
    ) -> Result<BranchChanges>;
}

/// Reads changes from remote-tracking refs of a local clone.
///
/// Branch names are resolved as `{remote}/{branch}` so the diff matches what
/// the hosting provider will show.
pub struct GitChangeSource {
    repo_path: PathBuf,
    remote: String,
}

impl GitChangeSource {
    /// Creates a source for the clone at `repo_path` using `remote`.
    pub fn new(repo_path: PathBuf, remote: String) -> Self {
        Self { repo_path, remote }
    }
}

impl ChangeSource for GitChangeSource {
    fn collect(
        &self,
        source_branch: &str,
        target_branch: &str,
        scope: ChangeScope,
    ) -> Result<BranchChanges> {
        let repo = GitRepository::open_at(&self.repo_path)?;
        let base = format!("{}/{target_branch}", self.remote);
        let head = format!("{}/{source_branch}", self.remote);

        let changes = repo.collect_changes(&base, &head, scope)?;
        debug!(
            base = %base,
            head = %head,
            commits = changes.commits.len(),
            files = changes.files.len(),
            diff_len = changes.diff.as_ref().map_or(0, String::len),
            "Collected branch changes"
        );
        Ok(changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::git::repository::tests::feature_repo;

    #[test]
    fn reads_remote_tracking_refs() {
        let (dir, root, tip) = feature_repo();
        let repo = git2::Repository::open(dir.path()).unwrap();
        repo.reference("refs/remotes/origin/base", root, true, "test")
            .unwrap();
        repo.reference("refs/remotes/origin/feature", tip, true, "test")
            .unwrap();

        let source = GitChangeSource::new(dir.path().to_path_buf(), "origin".to_string());
        let changes = source
            .collect("feature", "base", ChangeScope::all())
            .unwrap();

        assert_eq!(changes.commits.len(), 2);
        assert_eq!(changes.files.len(), 2);
    }

    #[test]
    fn missing_remote_ref_fails() {
        let (dir, _, _) = feature_repo();
        let source = GitChangeSource::new(dir.path().to_path_buf(), "origin".to_string());
        assert!(source.collect("feature", "base", ChangeScope::all()).is_err());
    }
}
