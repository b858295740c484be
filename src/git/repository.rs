//! Git repository operations.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Commit, DiffFormat, Repository};

use crate::git::changes::{BranchChanges, ChangeScope};
use crate::git::SHORT_HASH_LEN;

/// Git repository wrapper.
pub struct GitRepository {
    repo: Repository,
}

/// How a local branch relates to its remote-tracking counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchSync {
    /// Commits on the local branch that the remote does not have.
    pub ahead: usize,
    /// Commits on the remote that the local branch does not have.
    pub behind: usize,
}

impl BranchSync {
    /// True when local and remote point at the same history.
    pub fn in_sync(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

impl GitRepository {
    /// Opens the repository containing the current directory.
    pub fn open() -> Result<Self> {
        let repo = Repository::discover(".").context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Opens the repository at the given path.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;

        Ok(Self { repo })
    }

    /// Returns the working directory, or the `.git` path for bare repositories.
    pub fn root(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    /// Returns the underlying git2 repository.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Returns the checked-out branch name.
    pub fn get_current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD reference")?;

        if let Some(name) = head.shorthand() {
            if name != "HEAD" {
                return Ok(name.to_string());
            }
        }

        anyhow::bail!("Repository is in detached HEAD state")
    }

    /// Returns the fetch URL of a remote.
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let remote_obj = self
            .repo
            .find_remote(remote)
            .with_context(|| format!("Remote '{remote}' not found"))?;
        remote_obj
            .url()
            .map(String::from)
            .with_context(|| format!("Remote '{remote}' has no URL"))
    }

    /// True when `refs/remotes/{remote}/{branch}` exists locally.
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/remotes/{remote}/{branch}"))
            .is_ok()
    }

    /// Compares `refs/heads/{branch}` with `refs/remotes/{remote}/{branch}`.
    pub fn branch_sync_state(&self, remote: &str, branch: &str) -> Result<BranchSync> {
        let local = self.resolve_commit(&format!("refs/heads/{branch}"))?;
        let upstream = self.resolve_commit(&format!("refs/remotes/{remote}/{branch}"))?;
        let (ahead, behind) = self
            .repo
            .graph_ahead_behind(local.id(), upstream.id())
            .context("Failed to compare local and remote branch")?;
        Ok(BranchSync { ahead, behind })
    }

    /// Resolves a revision spec to a commit.
    pub fn resolve_commit(&self, spec: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(spec)
            .with_context(|| format!("Failed to resolve '{spec}'"))?
            .peel_to_commit()
            .with_context(|| format!("'{spec}' does not point to a commit"))
    }

    /// Collects what `head` adds on top of `base`.
    ///
    /// The diff is taken from the merge base so that work landed on `base`
    /// after branching does not show up as reverted.
    pub fn collect_changes(&self, base: &str, head: &str, scope: ChangeScope) -> Result<BranchChanges> {
        let base_commit = self.resolve_commit(base)?;
        let head_commit = self.resolve_commit(head)?;

        let merge_base = self
            .repo
            .merge_base(base_commit.id(), head_commit.id())
            .with_context(|| format!("'{base}' and '{head}' have no common history"))?;
        let base_tree = self
            .repo
            .find_commit(merge_base)
            .context("Failed to find merge base commit")?
            .tree()
            .context("Failed to get merge base tree")?;
        let head_tree = head_commit.tree().context("Failed to get head tree")?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)
            .context("Failed to create diff")?;

        let mut changes = BranchChanges::default();

        if scope.include_file_list {
            changes.files = diff
                .deltas()
                .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
                .map(|path| path.display().to_string())
                .collect();
        }

        if scope.include_diff {
            let mut diff_content = String::new();
            diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
                let content = std::str::from_utf8(line.content()).unwrap_or("<binary>\n");
                let prefix = match line.origin() {
                    '+' => "+",
                    '-' => "-",
                    ' ' => " ",
                    _ => "",
                };
                diff_content.push_str(prefix);
                diff_content.push_str(content);
                true
            })
            .context("Failed to format diff")?;
            changes.diff = Some(diff_content);
        }

        if scope.include_commits {
            let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
            walker
                .push(head_commit.id())
                .context("Failed to push head commit")?;
            walker
                .hide(base_commit.id())
                .context("Failed to hide base commit")?;

            for oid in walker {
                let oid = oid.context("Failed to get commit OID from walker")?;
                let commit = self.repo.find_commit(oid).context("Failed to find commit")?;

                // Merge commits carry no authored intent of their own.
                if commit.parent_count() > 1 {
                    continue;
                }

                let hash = oid.to_string();
                let summary = commit.summary().unwrap_or("").trim().to_string();
                changes
                    .commits
                    .push(format!("{} {summary}", &hash[..SHORT_HASH_LEN]));
            }

            // Oldest first.
            changes.commits.reverse();
        }

        Ok(changes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use git2::{Oid, Signature};
    use tempfile::TempDir;

    /// Creates a commit on `refname` with a single changed file, without a workdir.
    pub(crate) fn commit_file(
        repo: &Repository,
        refname: &str,
        parent: Option<Oid>,
        file: &str,
        content: &str,
        message: &str,
    ) -> Oid {
        let signature = Signature::now("Test User", "test@example.com").unwrap();
        let parent_commit = parent.map(|oid| repo.find_commit(oid).unwrap());
        let parent_tree = parent_commit.as_ref().map(|c| c.tree().unwrap());

        let blob = repo.blob(content.as_bytes()).unwrap();
        let mut builder = repo.treebuilder(parent_tree.as_ref()).unwrap();
        builder.insert(file, blob, 0o100_644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();

        let parents: Vec<&Commit> = parent_commit.iter().collect();
        repo.commit(Some(refname), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    /// A repository with `base` (one commit) and `feature` (two more commits).
    pub(crate) fn feature_repo() -> (TempDir, Oid, Oid) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let root = commit_file(&repo, "refs/heads/base", None, "README.md", "hello\n", "Initial commit");
        let first = commit_file(
            &repo,
            "refs/heads/feature",
            Some(root),
            "login.rs",
            "fn login() {}\n",
            "PROJ-12 add login",
        );
        let tip = commit_file(
            &repo,
            "refs/heads/feature",
            Some(first),
            "README.md",
            "hello\nworld\n",
            "docs: mention login",
        );
        repo.set_head("refs/heads/feature").unwrap();
        (dir, root, tip)
    }

    #[test]
    fn current_branch_is_feature() {
        let (dir, _, _) = feature_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();
        assert_eq!(git.get_current_branch().unwrap(), "feature");
    }

    #[test]
    fn collect_changes_lists_commits_files_and_diff() {
        let (dir, _, _) = feature_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();

        let changes = git
            .collect_changes("base", "feature", ChangeScope::all())
            .unwrap();

        assert_eq!(changes.commits.len(), 2);
        assert!(changes.commits[0].ends_with("PROJ-12 add login"));
        assert!(changes.commits[1].ends_with("docs: mention login"));
        assert_eq!(changes.files, vec!["README.md".to_string(), "login.rs".to_string()]);
        let diff = changes.diff.unwrap();
        assert!(diff.contains("+fn login() {}"));
        assert!(diff.contains("+world"));
    }

    #[test]
    fn collect_changes_respects_scope() {
        let (dir, _, _) = feature_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();

        let scope = ChangeScope {
            include_diff: false,
            include_commits: true,
            include_file_list: false,
        };
        let changes = git.collect_changes("base", "feature", scope).unwrap();

        assert!(changes.diff.is_none());
        assert!(changes.files.is_empty());
        assert_eq!(changes.commits.len(), 2);
    }

    #[test]
    fn branch_sync_detects_unpushed_commits() {
        let (dir, root, tip) = feature_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();
        let repo = git.repository();

        repo.reference("refs/remotes/origin/feature", tip, true, "test")
            .unwrap();
        assert!(git.remote_branch_exists("origin", "feature"));
        assert!(git.branch_sync_state("origin", "feature").unwrap().in_sync());

        repo.reference("refs/remotes/origin/feature", root, true, "test")
            .unwrap();
        let sync = git.branch_sync_state("origin", "feature").unwrap();
        assert_eq!(sync, BranchSync { ahead: 2, behind: 0 });
    }

    #[test]
    fn missing_remote_is_an_error() {
        let (dir, _, _) = feature_repo();
        let git = GitRepository::open_at(dir.path()).unwrap();
        assert!(git.remote_url("origin").is_err());
        assert!(!git.remote_branch_exists("origin", "feature"));
    }
}
