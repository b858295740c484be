//! The live draft and the review session that owns it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai::{GeneratedContent, GenerationOptions, PreviousResult};
use crate::data::{from_yaml, to_yaml_with_header};
use crate::provider::ExistingRequest;

const EDIT_HEADER: &str = "Edit the title and description below, then save and close the editor.
Lines starting with '#' are ignored. Keep the `description: |` block indented.";

/// Title and description being prepared for the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    /// One-line title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Model that generated the content this draft started from.
    pub source_model: String,
    /// How the content was generated, reused when regenerating.
    pub prompt_options: Option<GenerationOptions>,
}

#[derive(Serialize, Deserialize)]
struct EditableFields {
    title: String,
    #[serde(default)]
    description: String,
}

impl RequestDraft {
    /// Wraps freshly generated content.
    pub fn from_generated(content: GeneratedContent, options: GenerationOptions) -> Self {
        Self {
            title: content.title,
            description: content.description,
            source_model: content.model,
            prompt_options: Some(options),
        }
    }

    /// This draft as the starting point of a revision.
    pub fn as_previous_result(&self) -> PreviousResult {
        PreviousResult {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    /// Renders title and description as one commented YAML buffer.
    pub fn to_edit_buffer(&self) -> Result<String> {
        to_yaml_with_header(
            EDIT_HEADER,
            &EditableFields {
                title: self.title.clone(),
                description: self.description.clone(),
            },
        )
    }

    /// Reads `(title, description)` back from an edited buffer.
    pub fn parse_edit_buffer(text: &str) -> Result<(String, String)> {
        let fields: EditableFields =
            from_yaml(text).context("Edited content is not valid YAML")?;
        let title = fields.title.trim().to_string();
        if title.is_empty() {
            bail!("Title must not be empty");
        }
        Ok((title, fields.description.trim_end().to_string()))
    }
}

/// State of one interactive review.
///
/// Holds exactly one live draft plus the snapshot it can be rolled back to.
#[derive(Debug)]
pub struct ReviewSession {
    draft: RequestDraft,
    original: RequestDraft,
    has_changes: bool,
    existing: Option<ExistingRequest>,
}

impl ReviewSession {
    /// Starts a session; `draft` also becomes the rollback snapshot.
    pub fn new(draft: RequestDraft, existing: Option<ExistingRequest>) -> Self {
        Self {
            original: draft.clone(),
            draft,
            has_changes: false,
            existing,
        }
    }

    /// The live draft.
    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    /// The draft the session started with.
    pub fn original(&self) -> &RequestDraft {
        &self.original
    }

    /// Whether the draft was edited or regenerated since the start.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    /// The request found at the start of the run, if any.
    pub fn existing(&self) -> Option<&ExistingRequest> {
        self.existing.as_ref()
    }

    /// Replaces title and description with user-entered values.
    pub fn apply_edit(&mut self, title: String, description: String) {
        self.draft.title = title;
        self.draft.description = description;
        self.has_changes = true;
    }

    /// Replaces the whole draft with regenerated content.
    pub fn apply_regeneration(&mut self, draft: RequestDraft) {
        self.draft = draft;
        self.has_changes = true;
    }

    /// Restores the snapshot. Returns `false` when there was nothing to undo.
    pub fn rollback(&mut self) -> bool {
        if !self.has_changes {
            return false;
        }
        self.draft = self.original.clone();
        self.has_changes = false;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft(title: &str, description: &str) -> RequestDraft {
        RequestDraft {
            title: title.to_string(),
            description: description.to_string(),
            source_model: "mock-model".to_string(),
            prompt_options: Some(GenerationOptions::default()),
        }
    }

    #[test]
    fn new_session_has_no_changes() {
        let session = ReviewSession::new(draft("T1", "D1"), None);
        assert!(!session.has_changes());
        assert_eq!(session.draft(), session.original());
    }

    #[test]
    fn rollback_without_changes_is_noop() {
        let mut session = ReviewSession::new(draft("T1", "D1"), None);
        assert!(!session.rollback());
        assert_eq!(session.draft().title, "T1");
    }

    #[test]
    fn edit_then_rollback_restores_original() {
        let mut session = ReviewSession::new(draft("T1", "D1"), None);
        session.apply_edit("T2".to_string(), "D2".to_string());
        assert!(session.has_changes());
        assert_eq!(session.draft().source_model, "mock-model");

        assert!(session.rollback());
        assert!(!session.has_changes());
        assert_eq!(session.draft(), &draft("T1", "D1"));
    }

    #[test]
    fn edit_buffer_round_trip() {
        let original = draft("Fix: crash on start", "Summary.\n\n- guard null\n- add test");
        let buffer = original.to_edit_buffer().unwrap();
        assert!(buffer.starts_with("# Edit the title"));

        let (title, description) = RequestDraft::parse_edit_buffer(&buffer).unwrap();
        assert_eq!(title, original.title);
        assert_eq!(description, original.description);
    }

    #[test]
    fn edit_buffer_rejects_garbage_and_empty_title() {
        assert!(RequestDraft::parse_edit_buffer("just some words").is_err());
        assert!(RequestDraft::parse_edit_buffer("title: ''\ndescription: x").is_err());
    }

    #[derive(Debug, Clone)]
    enum Change {
        Edit(String, String),
        Regenerate(String, String),
    }

    fn change() -> impl Strategy<Value = Change> {
        prop_oneof![
            ("[a-zA-Z ]{0,12}", "[a-zA-Z \n]{0,24}").prop_map(|(t, d)| Change::Edit(t, d)),
            ("[a-zA-Z ]{1,12}", "[a-zA-Z \n]{0,24}").prop_map(|(t, d)| Change::Regenerate(t, d)),
        ]
    }

    proptest! {
        #[test]
        fn any_changes_then_rollback_restore_initial_draft(changes in prop::collection::vec(change(), 0..8)) {
            let initial = draft("Initial title", "Initial\ndescription");
            let mut session = ReviewSession::new(initial.clone(), None);

            for change in &changes {
                match change.clone() {
                    Change::Edit(t, d) => session.apply_edit(t, d),
                    Change::Regenerate(t, d) => session.apply_regeneration(draft(&t, &d)),
                }
                prop_assert!(session.has_changes());
            }

            prop_assert_eq!(session.rollback(), !changes.is_empty());
            prop_assert!(!session.has_changes());
            prop_assert_eq!(session.draft(), &initial);
        }
    }
}
