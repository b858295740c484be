//! Project configuration loaded from layered `config.json` files.
//!
//! The global file (`~/.pr-scribe/config.json`) is read first, then the
//! repository-local file (`./.pr-scribe/config.json`) is laid over it
//! field by field. Command-line flags and environment variables are applied
//! by the caller on top of the merged result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;
use crate::utils::settings::CONFIG_DIR_NAME;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default pattern used to recognise JIRA ticket keys.
pub const DEFAULT_JIRA_PATTERN: &str = r"\b[A-Z][A-Z0-9]+-\d+\b";

/// Project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Hosting provider, when it cannot be inferred from the remote URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,

    /// GitHub REST API base URL (GitHub Enterprise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,

    /// GitLab instance URL (self-hosted GitLab).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_url: Option<String>,

    /// Git remote to read identity and branches from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Default target branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,

    /// Editor command used when no editor environment variable is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Regular expression matching JIRA ticket keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_pattern: Option<String>,

    /// AI generation settings.
    #[serde(default)]
    pub ai: AiConfig,
}

/// AI generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// Backend name: `claude`, `openai` or `ollama`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Maximum number of tokens in a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AiConfig {
    fn merge(self, overlay: Self) -> Self {
        Self {
            provider: overlay.provider.or(self.provider),
            model: overlay.model.or(self.model),
            max_tokens: overlay.max_tokens.or(self.max_tokens),
        }
    }
}

impl ProjectConfig {
    /// Lays `overlay` over `self`; fields set in `overlay` win.
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            provider: overlay.provider.or(self.provider),
            github_api_url: overlay.github_api_url.or(self.github_api_url),
            gitlab_url: overlay.gitlab_url.or(self.gitlab_url),
            remote: overlay.remote.or(self.remote),
            target_branch: overlay.target_branch.or(self.target_branch),
            editor: overlay.editor.or(self.editor),
            jira_pattern: overlay.jira_pattern.or(self.jira_pattern),
            ai: self.ai.merge(overlay.ai),
        }
    }

    /// Reads a single configuration file; a missing file is an empty config.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Returns the configured JIRA pattern or the default one.
    pub fn jira_pattern(&self) -> &str {
        self.jira_pattern.as_deref().unwrap_or(DEFAULT_JIRA_PATTERN)
    }

    /// Returns the configured remote or `origin`.
    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or("origin")
    }
}

/// Locates and loads the layered configuration.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    local_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader for the repository rooted at `repo_root`.
    pub fn new(repo_root: &Path) -> Self {
        Self {
            global_path: dirs::home_dir()
                .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
            local_path: repo_root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
        }
    }

    /// Creates a loader with explicit file locations.
    pub fn with_paths(global_path: Option<PathBuf>, local_path: PathBuf) -> Self {
        Self {
            global_path,
            local_path,
        }
    }

    /// Path of the global configuration file, if a home directory exists.
    pub fn global_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Path of the repository-local configuration file.
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Loads the global file, then the local file over it.
    pub fn load(&self) -> Result<ProjectConfig> {
        let global = match &self.global_path {
            Some(path) => ProjectConfig::load_from_path(path)?,
            None => ProjectConfig::default(),
        };
        let local = ProjectConfig::load_from_path(&self.local_path)?;

        Ok(global.merge(local))
    }
}
