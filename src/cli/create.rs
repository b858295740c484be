//! `create` command: validate, wire up collaborators and run the workflow.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, warn};

use crate::ai::{create_ai_client, AiContentGenerator};
use crate::config::{ConfigLoader, ProjectConfig};
use crate::editor::ExternalEditor;
use crate::git::{
    detect_default_branch, extract_tickets, merge_tickets, ChangeScope, GitChangeSource,
    GitRepository, RemoteLocation,
};
use crate::provider::{GitHubProvider, GitLabProvider, ProviderKind, RepoProvider};
use crate::utils::preflight::{
    check_ai_credentials, check_branch_pair, check_provider_token, AiCredentialInfo,
};
use crate::utils::settings::get_env_var;
use crate::workflow::{StdConsole, Workflow, WorkflowInputs};

/// Create command options.
#[derive(Parser)]
pub struct CreateCommand {
    /// Branch to merge into (defaults to config, then the remote's default branch).
    #[arg(long, value_name = "BRANCH")]
    pub target: Option<String>,

    /// Branch to merge from (defaults to the checked-out branch).
    #[arg(long, value_name = "BRANCH")]
    pub source: Option<String>,

    /// JIRA ticket keys to reference, comma separated.
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    pub jira: Vec<String>,

    /// Hosting provider (inferred from the remote URL when omitted).
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Repository path, e.g. `owner/repo` or `group/sub/project`.
    #[arg(long, value_name = "PATH")]
    pub repo: Option<String>,

    /// AI model to use.
    #[arg(long)]
    pub model: Option<String>,

    /// Git remote to read branches and identity from.
    #[arg(long)]
    pub remote: Option<String>,
}

/// Everything resolved before any network call.
struct PreparedRun {
    config: ProjectConfig,
    repo_root: PathBuf,
    remote: String,
    kind: ProviderKind,
    remote_host: Option<String>,
    inputs: WorkflowInputs,
}

impl CreateCommand {
    /// Executes the create command and returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        let prepared = self.prepare()?;
        let ai_info = check_ai_credentials(self.model.as_deref(), &prepared.config.ai)?;
        let token = check_provider_token(prepared.kind)?;

        let provider = build_provider(
            prepared.kind,
            token,
            &prepared.config,
            prepared.remote_host.as_deref(),
        )?;
        let generator = AiContentGenerator::new(
            create_ai_client(&ai_info, prepared.config.ai.max_tokens)?,
            Box::new(GitChangeSource::new(
                prepared.repo_root.clone(),
                prepared.remote.clone(),
            )),
        );
        let editor = ExternalEditor::from_env(prepared.config.editor.as_deref());

        show_summary(&prepared, provider.as_ref(), &ai_info, &editor);

        let mut console = StdConsole;
        let outcome = Workflow::new(provider.as_ref(), &generator, &editor, &mut console)
            .run(&prepared.inputs)
            .await?;

        Ok(outcome.exit_code())
    }

    /// Loads config and validates the repository and branch pair.
    fn prepare(&self) -> Result<PreparedRun> {
        let git = GitRepository::open()?;
        let config = ConfigLoader::new(git.root()).load()?;

        let remote = self
            .remote
            .clone()
            .unwrap_or_else(|| config.remote().to_string());

        let source_branch = match &self.source {
            Some(branch) => branch.clone(),
            None => git.get_current_branch()?,
        };
        let target_branch = self
            .target
            .clone()
            .or_else(|| get_env_var("PR_SCRIBE_TARGET_BRANCH").ok())
            .or_else(|| config.target_branch.clone())
            .or_else(|| detect_default_branch(git.repository(), &remote))
            .context("Could not determine the target branch. Pass --target or set targetBranch in config")?;

        check_branch_pair(&source_branch, &target_branch)?;
        validate_remote_branches(&git, &remote, &source_branch, &target_branch)?;

        let (kind, repository, remote_host) = self.resolve_repository(&git, &remote, &config)?;

        let jira_tickets = discover_tickets(&git, &config, &remote, &source_branch, &target_branch)
            .map(|found| merge_tickets(&self.jira, found))
            .unwrap_or_else(|e| {
                warn!(error = %e, "Ticket discovery failed");
                merge_tickets(&self.jira, Vec::new())
            });

        Ok(PreparedRun {
            repo_root: git.root().to_path_buf(),
            config,
            remote,
            kind,
            remote_host,
            inputs: WorkflowInputs {
                repository,
                source_branch,
                target_branch,
                jira_tickets,
            },
        })
    }

    /// Works out provider kind and repository path, flags first.
    fn resolve_repository(
        &self,
        git: &GitRepository,
        remote: &str,
        config: &ProjectConfig,
    ) -> Result<(ProviderKind, String, Option<String>)> {
        let location = match git.remote_url(remote) {
            Ok(url) => Some(RemoteLocation::parse(&url)?),
            Err(e) if self.repo.is_some() => {
                debug!(error = %e, "Remote URL unavailable, using --repo");
                None
            }
            Err(e) => return Err(e),
        };

        let kind = self
            .provider
            .or(config.provider)
            .or_else(|| {
                location
                    .as_ref()
                    .and_then(|loc| ProviderKind::from_host(&loc.host))
            })
            .context("Could not infer the hosting provider from the remote URL. Pass --provider or set provider in config")?;

        let repository = match (&self.repo, &location) {
            (Some(repo), _) => repo.trim_matches('/').to_string(),
            (None, Some(loc)) => loc.path.clone(),
            (None, None) => bail!("Could not determine the repository. Pass --repo"),
        };

        Ok((kind, repository, location.map(|loc| loc.host)))
    }
}

/// The source must be pushed and the local branch must not be ahead of it.
fn validate_remote_branches(
    git: &GitRepository,
    remote: &str,
    source_branch: &str,
    target_branch: &str,
) -> Result<()> {
    if !git.remote_branch_exists(remote, source_branch) {
        bail!(
            "Branch '{source_branch}' has not been pushed to '{remote}'. Run: git push -u {remote} {source_branch}"
        );
    }
    if !git.remote_branch_exists(remote, target_branch) {
        bail!("Target branch '{target_branch}' does not exist on '{remote}'");
    }

    if git
        .repository()
        .find_reference(&format!("refs/heads/{source_branch}"))
        .is_ok()
    {
        let sync = git.branch_sync_state(remote, source_branch)?;
        if sync.ahead > 0 {
            bail!(
                "Local branch '{source_branch}' is {} commit(s) ahead of '{remote}/{source_branch}'. Push your changes first",
                sync.ahead
            );
        }
        if sync.behind > 0 {
            warn!(
                behind = sync.behind,
                "Local branch is behind its remote; the remote version will be described"
            );
        }
    }
    Ok(())
}

/// Ticket keys from the branch name and the branch's commit subjects.
fn discover_tickets(
    git: &GitRepository,
    config: &ProjectConfig,
    remote: &str,
    source_branch: &str,
    target_branch: &str,
) -> Result<Vec<String>> {
    let scope = ChangeScope {
        include_diff: false,
        include_commits: true,
        include_file_list: false,
    };
    let changes = git.collect_changes(
        &format!("{remote}/{target_branch}"),
        &format!("{remote}/{source_branch}"),
        scope,
    )?;

    let texts = std::iter::once(source_branch).chain(changes.commits.iter().map(String::as_str));
    extract_tickets(config.jira_pattern(), texts)
}

/// Builds the provider client, honouring self-hosted instances.
fn build_provider(
    kind: ProviderKind,
    token: String,
    config: &ProjectConfig,
    remote_host: Option<&str>,
) -> Result<Box<dyn RepoProvider>> {
    let provider: Box<dyn RepoProvider> = match kind {
        ProviderKind::GitHub => {
            let api_url = get_env_var("GITHUB_API_URL")
                .ok()
                .or_else(|| config.github_api_url.clone())
                .or_else(|| {
                    remote_host
                        .filter(|host| *host != "github.com")
                        .map(|host| format!("https://{host}/api/v3"))
                });
            match api_url {
                Some(url) => Box::new(GitHubProvider::with_api_url(token, &url)?),
                None => Box::new(GitHubProvider::new(token)?),
            }
        }
        ProviderKind::GitLab => {
            let instance_url = get_env_var("GITLAB_URL")
                .ok()
                .or_else(|| config.gitlab_url.clone())
                .or_else(|| {
                    remote_host
                        .filter(|host| *host != "gitlab.com")
                        .map(|host| format!("https://{host}"))
                });
            match instance_url {
                Some(url) => Box::new(GitLabProvider::with_instance_url(token, &url)?),
                None => Box::new(GitLabProvider::new(token)?),
            }
        }
    };
    Ok(provider)
}

fn show_summary(
    prepared: &PreparedRun,
    provider: &dyn RepoProvider,
    ai_info: &AiCredentialInfo,
    editor: &ExternalEditor,
) {
    let inputs = &prepared.inputs;
    println!("📦 Repository: {} ({})", inputs.repository, provider.name());
    println!(
        "🌿 Branches: {} → {}",
        inputs.source_branch, inputs.target_branch
    );
    if !inputs.jira_tickets.is_empty() {
        println!("🎫 JIRA: {}", inputs.jira_tickets.join(", "));
    }
    println!("🤖 AI: {} ({})", ai_info.provider, ai_info.model);
    match editor.command() {
        Some(command) => println!("📝 Editor: {command}"),
        None => println!("📝 Editor: none configured, edits will be typed in the terminal"),
    }
}
