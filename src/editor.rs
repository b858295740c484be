//! External editor integration.

use std::io::{self, Write};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::utils::settings::get_env_vars;

/// Environment variables consulted for the editor command, in order.
pub const EDITOR_VARIABLES: &[&str] = &["PR_SCRIBE_EDITOR", "VISUAL", "EDITOR"];

/// Errors raised by an editor session.
#[derive(Error, Debug)]
pub enum EditorError {
    /// No editor command could be found.
    #[error("No editor configured (set PR_SCRIBE_EDITOR, VISUAL or EDITOR)")]
    NotConfigured,

    /// The editor process could not be started.
    #[error("Failed to execute editor '{editor}': {source}")]
    Spawn {
        /// Editor command as configured.
        editor: String,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },

    /// The editor exited with a failure status.
    #[error("Editor '{editor}' exited with non-zero status: {code:?}")]
    ExitStatus {
        /// Editor command as configured.
        editor: String,
        /// Exit code, absent when killed by a signal.
        code: Option<i32>,
    },

    /// Temporary buffer could not be written or read back.
    #[error("Editor buffer I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Lets the user edit a text buffer.
pub trait EditorBridge: Send + Sync {
    /// Whether an editor is available at all.
    fn is_configured(&self) -> bool;

    /// Opens `initial_text` for editing and returns what the user saved.
    ///
    /// `extension_hint` (e.g. `"yaml"`, `"md"`) picks the temp file suffix so
    /// editors can choose a syntax mode.
    fn edit_buffer(&self, initial_text: &str, extension_hint: &str) -> Result<String, EditorError>;
}

/// Runs a user-configured editor command on a temporary file.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    /// Uses `command` (e.g. `"code --wait"`) as the editor.
    pub fn new(command: Option<String>) -> Self {
        let command = command.filter(|c| !c.trim().is_empty());
        Self { command }
    }

    /// Resolves the editor from the environment, then `config_editor`.
    pub fn from_env(config_editor: Option<&str>) -> Self {
        let command = get_env_vars(EDITOR_VARIABLES)
            .ok()
            .or_else(|| config_editor.map(str::to_string));
        Self::new(command)
    }

    /// The resolved editor command, if any.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl EditorBridge for ExternalEditor {
    fn is_configured(&self) -> bool {
        self.command.is_some()
    }

    fn edit_buffer(&self, initial_text: &str, extension_hint: &str) -> Result<String, EditorError> {
        let editor = self.command.as_deref().ok_or(EditorError::NotConfigured)?;

        let mut file = tempfile::Builder::new()
            .prefix("pr-scribe-")
            .suffix(&format!(".{}", extension_hint.trim_start_matches('.')))
            .tempfile()?;
        file.write_all(initial_text.as_bytes())?;
        file.flush()?;

        info!(editor = %editor, path = %file.path().display(), "Opening editor");

        let (editor_cmd, args) = parse_editor_command(editor);
        let status = Command::new(editor_cmd)
            .args(args)
            .arg(file.path())
            .status()
            .map_err(|source| EditorError::Spawn {
                editor: editor.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::ExitStatus {
                editor: editor.to_string(),
                code: status.code(),
            });
        }

        let edited = std::fs::read_to_string(file.path())?;
        debug!(len = edited.len(), "Editor session completed");
        Ok(edited)
    }
}

/// Splits an editor command string into the executable and its arguments.
///
/// Handles editors specified with arguments, e.g. `"code --wait"` becomes
/// `("code", vec!["--wait"])`.
pub(crate) fn parse_editor_command(editor: &str) -> (&str, Vec<&str>) {
    let mut parts = editor.split_whitespace();
    let cmd = parts.next().unwrap_or(editor);
    let args: Vec<&str> = parts.collect();
    (cmd, args)
}

/// Drops `#` comment lines and trims surrounding blank space.
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_editor_with_args() {
        assert_eq!(parse_editor_command("code --wait"), ("code", vec!["--wait"]));
        assert_eq!(parse_editor_command("vim"), ("vim", vec![]));
    }

    #[test]
    fn strip_removes_indented_comments_and_padding() {
        let text = "# Instructions\n  # indented\n\nFocus on perf\n\n";
        assert_eq!(strip_comment_lines(text), "Focus on perf");
    }

    #[test]
    fn strip_keeps_inner_hashes() {
        assert_eq!(
            strip_comment_lines("fix #12\nkeep C# notes"),
            "fix #12\nkeep C# notes"
        );
    }

    #[test]
    fn blank_command_is_not_configured() {
        let editor = ExternalEditor::new(Some("  ".to_string()));
        assert!(!editor.is_configured());
        assert!(matches!(
            editor.edit_buffer("x", "md"),
            Err(EditorError::NotConfigured)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn successful_editor_returns_buffer() {
        let editor = ExternalEditor::new(Some("true".to_string()));
        assert_eq!(editor.edit_buffer("hello", "md").unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn failing_editor_reports_status() {
        let editor = ExternalEditor::new(Some("false".to_string()));
        assert!(matches!(
            editor.edit_buffer("hello", "md"),
            Err(EditorError::ExitStatus { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn editor_changes_are_read_back() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-editor.sh");
        std::fs::write(&script, "#!/bin/sh\nprintf 'edited' > \"$1\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let editor = ExternalEditor::new(Some(script.display().to_string()));
        assert_eq!(editor.edit_buffer("before", "yaml").unwrap(), "edited");
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let editor = ExternalEditor::new(Some("pr-scribe-no-such-editor-xyz".to_string()));
        assert!(matches!(
            editor.edit_buffer("x", "md"),
            Err(EditorError::Spawn { .. })
        ));
    }

    proptest! {
        #[test]
        fn stripped_text_has_no_comment_lines(text in "[ #a-z\n]{0,80}") {
            let stripped = strip_comment_lines(&text);
            prop_assert!(stripped.lines().all(|l| !l.trim_start().starts_with('#')));
            prop_assert_eq!(stripped.trim(), stripped.as_str());
        }

        #[test]
        fn stripping_is_idempotent(text in "[ #a-z\n]{0,80}") {
            let once = strip_comment_lines(&text);
            prop_assert_eq!(strip_comment_lines(&once), once.clone());
        }
    }
}
