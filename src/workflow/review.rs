//! Review loop over the live draft.

use std::io;

use tracing::{debug, warn};

use super::draft::{RequestDraft, ReviewSession};
use super::{Workflow, WorkflowError, WorkflowInputs, WorkflowOutcome};

/// Entries of the review menu. Numbering is fixed; rollback without
/// changes only reports that there is nothing to undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Create or update the request.
    Save,
    /// Edit title and description.
    Edit,
    /// Regenerate with extra instructions.
    Regenerate,
    /// Restore the original draft.
    Rollback,
    /// Stop without saving.
    Cancel,
}

impl ReviewAction {
    /// Number of menu entries.
    pub const COUNT: usize = 5;

    /// Parses a menu answer (`1`..`5`).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Save),
            "2" => Some(Self::Edit),
            "3" => Some(Self::Regenerate),
            "4" => Some(Self::Rollback),
            "5" => Some(Self::Cancel),
            _ => None,
        }
    }
}

/// Menu text for the current session state.
pub fn menu_text(noun: &str, is_update: bool, has_changes: bool) -> String {
    let save = if is_update { "update" } else { "create" };
    let rollback_note = if has_changes { "" } else { " (no changes yet)" };
    format!(
        "What would you like to do?\n  1. Save ({save} the {noun})\n  2. Edit title and description\n  3. Regenerate with instructions\n  4. Roll back to the original draft{rollback_note}\n  5. Cancel"
    )
}

impl Workflow<'_> {
    /// Runs the menu until save or cancel.
    pub(super) async fn review(
        &mut self,
        inputs: &WorkflowInputs,
        session: &mut ReviewSession,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        self.show_draft(session.draft());

        loop {
            let Some(action) = self.ask_action(session)? else {
                return Ok(self.cancelled());
            };
            debug!(?action, has_changes = session.has_changes(), "Review action");

            match action {
                ReviewAction::Save => return Ok(self.finalize(inputs, session).await),
                ReviewAction::Edit => {
                    if !self.edit(session)? {
                        return Ok(self.cancelled());
                    }
                    self.show_draft(session.draft());
                }
                ReviewAction::Regenerate => {
                    if self.regenerate(inputs, session).await {
                        self.show_draft(session.draft());
                    }
                }
                ReviewAction::Rollback => {
                    if session.rollback() {
                        self.console.say("↩️  Restored the original draft.");
                        self.show_draft(session.draft());
                    } else {
                        self.console.say("ℹ️  Nothing to roll back.");
                    }
                }
                ReviewAction::Cancel => return Ok(self.cancelled()),
            }
        }
    }

    fn show_draft(&mut self, draft: &RequestDraft) {
        let noun = self.provider.request_noun();
        self.console.say(&format!(
            "\n📝 Proposed {noun} (generated by {}):\n─────────────────────────────\nTitle: {}\n\n{}\n─────────────────────────────",
            draft.source_model, draft.title, draft.description
        ));
    }

    fn ask_action(&mut self, session: &ReviewSession) -> Result<Option<ReviewAction>, WorkflowError> {
        let menu = menu_text(
            self.provider.request_noun(),
            session.existing().is_some(),
            session.has_changes(),
        );
        self.console.say(&menu);

        loop {
            let Some(answer) = self.console.ask("Choose an option [1-5]: ")? else {
                return Ok(None);
            };
            if let Some(action) = ReviewAction::parse(&answer) {
                return Ok(Some(action));
            }
            self.console.say(&format!(
                "Invalid choice. Please enter a number from 1 to {}.",
                ReviewAction::COUNT
            ));
        }
    }

    /// Edits the draft in the editor, falling back to manual entry.
    ///
    /// Returns `false` when input ended during manual entry.
    fn edit(&mut self, session: &mut ReviewSession) -> Result<bool, WorkflowError> {
        if self.editor.is_configured() {
            match self.edit_in_editor(session.draft()) {
                Ok((title, description)) => {
                    session.apply_edit(title, description);
                    self.console.say("✅ Draft updated.");
                    return Ok(true);
                }
                Err(e) => {
                    warn!(error = %e, "Editor edit failed, falling back to manual entry");
                    self.console
                        .say(&format!("⚠️  {e:#}. Falling back to manual entry."));
                }
            }
        }

        match self.manual_entry(session.draft())? {
            Some((title, description)) => {
                session.apply_edit(title, description);
                self.console.say("✅ Draft updated.");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn edit_in_editor(&self, draft: &RequestDraft) -> anyhow::Result<(String, String)> {
        let buffer = draft.to_edit_buffer()?;
        let edited = self.editor.edit_buffer(&buffer, "yaml")?;
        RequestDraft::parse_edit_buffer(&edited)
    }

    /// Reads a title line and description lines from the console.
    ///
    /// Empty answers keep the current values. `None` if input ends at the title.
    fn manual_entry(&mut self, current: &RequestDraft) -> io::Result<Option<(String, String)>> {
        let Some(title) = self.console.ask("Title (leave empty to keep current): ")? else {
            return Ok(None);
        };
        let title = match title.trim() {
            "" => current.title.clone(),
            entered => entered.to_string(),
        };

        self.console.say(
            "Description (finish with a line containing only '.', leave empty to keep current):",
        );
        let mut lines: Vec<String> = Vec::new();
        while let Some(line) = self.console.ask("> ")? {
            if line.trim() == "." {
                break;
            }
            lines.push(line);
        }

        let description = lines.join("\n").trim_end().to_string();
        let description = if description.trim().is_empty() {
            current.description.clone()
        } else {
            description
        };

        Ok(Some((title, description)))
    }

    /// Regenerates from the live draft. Failures keep the draft as it is.
    async fn regenerate(&mut self, inputs: &WorkflowInputs, session: &mut ReviewSession) -> bool {
        let draft = session.draft();
        let base = draft.prompt_options.clone().unwrap_or_default();
        let previous = draft.as_previous_result();

        match self.generate_seeded(inputs, &base, previous).await {
            Ok(draft) => {
                session.apply_regeneration(draft);
                self.console.say("✅ Draft regenerated.");
                true
            }
            Err(e) => {
                warn!(error = %e, "Regeneration failed, keeping current draft");
                self.console
                    .say(&format!("❌ Regeneration failed: {e:#}. Keeping the current draft."));
                false
            }
        }
    }
}
