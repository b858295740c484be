//! Prompt templates for pull/merge request generation.

use std::fmt::Write as _;

use super::generator::GenerationRequest;
use crate::git::BranchChanges;

/// Diffs longer than this are cut at a character boundary before sending.
pub const MAX_DIFF_CHARS: usize = 60_000;

/// System prompt for request title/description generation.
pub const SYSTEM_PROMPT: &str = r#"You are an expert software engineer writing pull request and merge request descriptions for your reviewers. You will receive the branch names, related JIRA tickets, and selected git context (commit subjects, changed files, unified diff).

Your task is to produce a title and a description that:
1. Accurately describe what the changes accomplish, based on the actual code changes
2. Give reviewers the context they need: purpose, scope and notable risks
3. Mention the related JIRA tickets when there are any

Writing Guidelines:
- The title is a single line, concise (50-80 characters ideal), imperative mood
- Prefix the title with the primary JIRA ticket when one is given (e.g. "PROJ-12: Add login form")
- The description is markdown with a short summary paragraph followed by a bullet list of changes
- Add a "Testing" section when the changes include or affect tests
- Do not invent changes that are not present in the provided context

CRITICAL RESPONSE FORMAT: You MUST respond with ONLY valid YAML content. Do not include any explanatory text or commentary.

Your response must follow this exact YAML structure:

title: "Concise request title"
description: |
  Markdown description here.
  Indent every description line by two spaces.

Start immediately with "title:" and provide only YAML content."#;

/// Builds the user prompt from the request and the collected git context.
pub fn build_user_prompt(request: &GenerationRequest, changes: &BranchChanges) -> String {
    let options = &request.options;
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Generate a title and description for a request merging `{}` into `{}`.\n",
        request.source_branch, request.target_branch
    );

    if request.jira_tickets.is_empty() {
        prompt.push_str("Related JIRA tickets: none\n\n");
    } else {
        let _ = writeln!(
            prompt,
            "Related JIRA tickets: {}\n",
            request.jira_tickets.join(", ")
        );
    }

    if options.include_commits {
        prompt.push_str("## Commits\n");
        if changes.commits.is_empty() {
            prompt.push_str("(no commits)\n");
        }
        for commit in &changes.commits {
            let _ = writeln!(prompt, "- {commit}");
        }
        prompt.push('\n');
    }

    if options.include_file_list {
        prompt.push_str("## Changed files\n");
        if changes.files.is_empty() {
            prompt.push_str("(no files)\n");
        }
        for file in &changes.files {
            let _ = writeln!(prompt, "- {file}");
        }
        prompt.push('\n');
    }

    if options.include_diff {
        if let Some(diff) = changes.diff.as_deref() {
            let (diff, truncated) = truncate_diff(diff, MAX_DIFF_CHARS);
            prompt.push_str("## Diff\n```diff\n");
            prompt.push_str(diff);
            if !diff.ends_with('\n') {
                prompt.push('\n');
            }
            prompt.push_str("```\n");
            if truncated {
                prompt.push_str("(diff truncated)\n");
            }
            prompt.push('\n');
        }
    }

    if let Some(previous) = &options.previous_result {
        prompt.push_str("## Previous version\n");
        prompt.push_str(
            "Revise the following title and description rather than starting from scratch.\n",
        );
        let _ = writeln!(prompt, "Title: {}", previous.title);
        let _ = writeln!(prompt, "Description:\n{}\n", previous.description);
    }

    if let Some(instructions) = options
        .additional_instructions
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        prompt.push_str("## Additional instructions\n");
        let _ = writeln!(prompt, "{}\n", instructions.trim());
    }

    prompt.push_str("Respond with YAML containing `title` and `description` only.");
    prompt
}

/// Cuts `diff` to at most `max_chars` characters.
fn truncate_diff(diff: &str, max_chars: usize) -> (&str, bool) {
    match diff.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&diff[..byte_idx], true),
        None => (diff, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::generator::{GenerationOptions, PreviousResult};

    fn request(options: GenerationOptions) -> GenerationRequest {
        GenerationRequest {
            source_branch: "feature/login".to_string(),
            target_branch: "main".to_string(),
            jira_tickets: vec!["PROJ-12".to_string()],
            options,
        }
    }

    fn changes() -> BranchChanges {
        BranchChanges {
            diff: Some("+fn login() {}\n".to_string()),
            commits: vec!["abcd1234 PROJ-12 add login".to_string()],
            files: vec!["src/login.rs".to_string()],
        }
    }

    #[test]
    fn default_options_include_all_sections() {
        let prompt = build_user_prompt(&request(GenerationOptions::default()), &changes());
        assert!(prompt.contains("`feature/login` into `main`"));
        assert!(prompt.contains("Related JIRA tickets: PROJ-12"));
        assert!(prompt.contains("- abcd1234 PROJ-12 add login"));
        assert!(prompt.contains("- src/login.rs"));
        assert!(prompt.contains("+fn login() {}"));
        assert!(!prompt.contains("Previous version"));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn disabled_sections_are_omitted() {
        let options = GenerationOptions {
            include_diff: false,
            include_commits: false,
            include_file_list: false,
            ..GenerationOptions::default()
        };
        let prompt = build_user_prompt(&request(options), &changes());
        assert!(!prompt.contains("## Commits"));
        assert!(!prompt.contains("## Changed files"));
        assert!(!prompt.contains("## Diff"));
    }

    #[test]
    fn previous_result_and_instructions_are_included() {
        let options = GenerationOptions {
            additional_instructions: Some("Focus on perf".to_string()),
            previous_result: Some(PreviousResult {
                title: "Old".to_string(),
                description: "Old body".to_string(),
            }),
            ..GenerationOptions::default()
        };
        let prompt = build_user_prompt(&request(options), &changes());
        assert!(prompt.contains("Title: Old"));
        assert!(prompt.contains("Old body"));
        assert!(prompt.contains("## Additional instructions\nFocus on perf"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let (cut, truncated) = truncate_diff("héllo", 2);
        assert_eq!(cut, "hé");
        assert!(truncated);

        let (whole, truncated) = truncate_diff("abc", 10);
        assert_eq!(whole, "abc");
        assert!(!truncated);
    }
}
