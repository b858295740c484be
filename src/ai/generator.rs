//! Title and description generation.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{prompts, AiClient, AiError};
use crate::git::{ChangeScope, ChangeSource};

/// Controls what context goes into a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Include the unified diff.
    pub include_diff: bool,
    /// Include commit subjects.
    pub include_commits: bool,
    /// Include the changed-file list.
    pub include_file_list: bool,
    /// Free-text guidance from the user.
    pub additional_instructions: Option<String>,
    /// Content to revise instead of writing from scratch.
    pub previous_result: Option<PreviousResult>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            include_diff: true,
            include_commits: true,
            include_file_list: true,
            additional_instructions: None,
            previous_result: None,
        }
    }
}

impl GenerationOptions {
    /// The git context these options ask for.
    pub fn scope(&self) -> ChangeScope {
        ChangeScope {
            include_diff: self.include_diff,
            include_commits: self.include_commits,
            include_file_list: self.include_file_list,
        }
    }

    /// Same context selection, seeded with `previous` and `instructions`.
    pub fn seeded(&self, previous: PreviousResult, instructions: String) -> Self {
        Self {
            additional_instructions: Some(instructions),
            previous_result: Some(previous),
            ..self.clone()
        }
    }
}

/// A title/description pair to be revised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousResult {
    /// Previous title.
    pub title: String,
    /// Previous description.
    pub description: String,
}

/// Everything the generator needs for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Branch being merged.
    pub source_branch: String,
    /// Branch merged into.
    pub target_branch: String,
    /// Related ticket keys.
    pub jira_tickets: Vec<String>,
    /// Context selection and seeding.
    pub options: GenerationOptions,
}

/// Generated request content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    /// One-line title.
    pub title: String,
    /// Markdown body.
    pub description: String,
    /// Model that produced the content.
    pub model: String,
}

/// Produces request content from branch context.
pub trait ContentGenerator: Send + Sync {
    /// Generates a title and description for `request`.
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedContent>> + Send + 'a>>;
}

/// [`ContentGenerator`] backed by an AI client and git context.
pub struct AiContentGenerator {
    client: Box<dyn AiClient>,
    changes: Box<dyn ChangeSource>,
}

impl AiContentGenerator {
    /// Creates a generator from an AI client and a change source.
    pub fn new(client: Box<dyn AiClient>, changes: Box<dyn ChangeSource>) -> Self {
        Self { client, changes }
    }
}

impl ContentGenerator for AiContentGenerator {
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GeneratedContent>> + Send + 'a>> {
        // Git context is read before the future is built; git2 handles are not Send.
        let changes = self
            .changes
            .collect(
                &request.source_branch,
                &request.target_branch,
                request.options.scope(),
            )
            .context("Failed to collect branch changes");

        Box::pin(async move {
            let changes = changes?;
            let user_prompt = prompts::build_user_prompt(request, &changes);
            let metadata = self.client.get_metadata();

            info!(
                provider = %metadata.provider,
                model = %metadata.model,
                commits = changes.commits.len(),
                files = changes.files.len(),
                "Generating request content"
            );

            let response = self
                .client
                .send_request(prompts::SYSTEM_PROMPT, &user_prompt)
                .await?;
            let (title, description) = parse_generated_content(&response)?;

            Ok(GeneratedContent {
                title,
                description,
                model: metadata.model,
            })
        })
    }
}

#[derive(Deserialize)]
struct RawContent {
    title: String,
    #[serde(default)]
    description: String,
}

/// Parses a model response into `(title, description)`.
///
/// Accepts bare YAML or YAML inside a fenced code block.
pub fn parse_generated_content(content: &str) -> Result<(String, String)> {
    let yaml_content = if content.contains("```yaml") {
        content
            .split("```yaml")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(content)
            .trim()
    } else if content.contains("```") {
        content
            .split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(content)
            .trim()
    } else {
        content.trim()
    };

    let raw: RawContent = serde_yaml::from_str(yaml_content).map_err(|e| {
        debug!(raw_response = %content, "Generated content is not valid YAML");
        if yaml_content.lines().any(|line| line.contains('\t')) {
            AiError::ContentParsingFailed(
                "Found tab characters. YAML requires spaces for indentation.".to_string(),
            )
        } else {
            AiError::ContentParsingFailed(format!("YAML parsing error: {e}"))
        }
    })?;

    let title = raw.title.trim().to_string();
    if title.is_empty() {
        return Err(AiError::ContentParsingFailed("Generated title is empty".to_string()).into());
    }

    Ok((title, raw.description.trim_end().to_string()))
}
