//! Preflight validation checks for early failure detection.
//!
//! These run before any network call so that missing credentials or an
//! unusable branch pair fail fast with a clear message.

use anyhow::{bail, Result};

use crate::config::AiConfig;
use crate::provider::ProviderKind;
use crate::utils::settings::{env_flag, get_env_var, get_env_vars};

/// Default Anthropic model.
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-opus-4-1-20250805";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Result of AI credential validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiCredentialInfo {
    /// The AI provider that will be used.
    pub provider: AiProvider,
    /// The model that will be used.
    pub model: String,
}

/// AI provider types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Anthropic Claude API.
    Claude,
    /// OpenAI API.
    OpenAi,
    /// Local Ollama.
    Ollama,
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "Claude API"),
            Self::OpenAi => write!(f, "OpenAI API"),
            Self::Ollama => write!(f, "Ollama"),
        }
    }
}

/// Picks the AI backend: environment flags first, then the configured name.
pub fn resolve_ai_provider(
    use_ollama: bool,
    use_openai: bool,
    configured: Option<&str>,
) -> Result<AiProvider> {
    if use_ollama {
        return Ok(AiProvider::Ollama);
    }
    if use_openai {
        return Ok(AiProvider::OpenAi);
    }
    match configured.map(str::to_lowercase).as_deref() {
        None | Some("claude" | "anthropic") => Ok(AiProvider::Claude),
        Some("openai") => Ok(AiProvider::OpenAi),
        Some("ollama") => Ok(AiProvider::Ollama),
        Some(other) => bail!("Unknown AI provider '{other}'. Expected claude, openai or ollama"),
    }
}

/// Validates AI credentials are available before any generation.
///
/// This only inspects environment variables and settings; no client is built.
pub fn check_ai_credentials(
    model_override: Option<&str>,
    ai_config: &AiConfig,
) -> Result<AiCredentialInfo> {
    let provider = resolve_ai_provider(
        env_flag("USE_OLLAMA"),
        env_flag("USE_OPENAI"),
        ai_config.provider.as_deref(),
    )?;

    let pick_model = |env_key: &str, default: &str| {
        model_override
            .map(String::from)
            .or_else(|| get_env_var(env_key).ok())
            .or_else(|| ai_config.model.clone())
            .unwrap_or_else(|| default.to_string())
    };

    let model = match provider {
        AiProvider::Ollama => pick_model("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
        AiProvider::OpenAi => {
            get_env_vars(&["OPENAI_API_KEY", "OPENAI_AUTH_TOKEN"]).map_err(|_| {
                anyhow::anyhow!(
                    "OpenAI API key not found.\n\
                     Set one of these environment variables:\n\
                     - OPENAI_API_KEY\n\
                     - OPENAI_AUTH_TOKEN"
                )
            })?;
            pick_model("OPENAI_MODEL", DEFAULT_OPENAI_MODEL)
        }
        AiProvider::Claude => {
            get_env_vars(&["CLAUDE_API_KEY", "ANTHROPIC_API_KEY", "ANTHROPIC_AUTH_TOKEN"])
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Claude API key not found.\n\
                         Set one of these environment variables:\n\
                         - CLAUDE_API_KEY\n\
                         - ANTHROPIC_API_KEY\n\
                         - ANTHROPIC_AUTH_TOKEN"
                    )
                })?;
            pick_model("ANTHROPIC_MODEL", DEFAULT_CLAUDE_MODEL)
        }
    };

    Ok(AiCredentialInfo { provider, model })
}

/// Returns the API token for the hosting provider.
pub fn check_provider_token(kind: ProviderKind) -> Result<String> {
    let variables = kind.token_variables();
    get_env_vars(variables).map_err(|_| {
        anyhow::anyhow!(
            "{kind} token not found.\nSet one of these environment variables:\n{}",
            variables
                .iter()
                .map(|v| format!("- {v}"))
                .collect::<Vec<_>>()
                .join("\n")
        )
    })
}

/// Rejects a source/target pair that cannot form a request.
pub fn check_branch_pair(source_branch: &str, target_branch: &str) -> Result<()> {
    if source_branch.trim().is_empty() || target_branch.trim().is_empty() {
        bail!("Source and target branches must both be set");
    }
    if source_branch == target_branch {
        bail!(
            "Source branch '{source_branch}' is the same as the target branch. \
             Switch to a feature branch or pass --target."
        );
    }
    Ok(())
}
