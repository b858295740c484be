//! Reconciliation gate shown when a request already exists.

use tracing::warn;

use super::draft::RequestDraft;
use super::{Workflow, WorkflowError, WorkflowInputs};
use crate::ai::{GenerationOptions, PreviousResult};
use crate::provider::ExistingRequest;

/// What to do about an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateChoice {
    /// Ignore the existing content and generate from scratch.
    RegenerateFresh,
    /// Revise the existing content following user instructions.
    RegenerateWithInstructions,
    /// Stop without changing anything.
    Cancel,
}

impl GateChoice {
    /// Number of menu entries.
    pub const COUNT: usize = 3;

    /// Parses a menu answer (`1`..`3`).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::RegenerateFresh),
            "2" => Some(Self::RegenerateWithInstructions),
            "3" => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl Workflow<'_> {
    /// Shows the existing request and produces the first draft.
    ///
    /// Returns `Ok(None)` when the user cancels.
    pub(super) async fn reconcile(
        &mut self,
        inputs: &WorkflowInputs,
        existing: &ExistingRequest,
    ) -> Result<Option<RequestDraft>, WorkflowError> {
        self.show_existing(existing);

        let choice = match self.ask_gate_choice()? {
            Some(choice) => choice,
            None => return Ok(None),
        };

        match choice {
            GateChoice::Cancel => Ok(None),
            GateChoice::RegenerateFresh => self.generate_fresh(inputs).await.map(Some),
            GateChoice::RegenerateWithInstructions => {
                let previous = PreviousResult {
                    title: existing.title.clone(),
                    description: existing.description.clone(),
                };
                match self
                    .generate_seeded(inputs, &GenerationOptions::default(), previous)
                    .await
                {
                    Ok(draft) => Ok(Some(draft)),
                    Err(e) => {
                        warn!(error = %e, "Seeded generation failed, falling back to fresh generation");
                        self.console.say(&format!(
                            "⚠️  Could not regenerate from the existing {}: {e:#}",
                            self.provider.request_noun()
                        ));
                        self.generate_fresh(inputs).await.map(Some)
                    }
                }
            }
        }
    }

    fn show_existing(&mut self, existing: &ExistingRequest) {
        let noun = self.provider.request_noun();
        let description = if existing.description.trim().is_empty() {
            "(empty)"
        } else {
            existing.description.as_str()
        };

        self.console.say(&format!(
            "\n📋 Found an existing {noun} {}:\n   Title:  {}\n   URL:    {}\n   Status: {}\n   Description:\n{description}\n",
            self.provider.request_ref(existing.id),
            existing.title,
            existing.url,
            existing.state,
        ));
        self.console.say(&format!(
            "How would you like to proceed?\n  1. Regenerate a fresh title and description\n  2. Regenerate from the existing {noun} with instructions\n  3. Cancel"
        ));
    }

    /// Re-prompts until a valid answer; `None` at end of input.
    fn ask_gate_choice(&mut self) -> Result<Option<GateChoice>, WorkflowError> {
        loop {
            let Some(answer) = self.console.ask("Choose an option [1-3]: ")? else {
                return Ok(None);
            };
            if let Some(choice) = GateChoice::parse(&answer) {
                return Ok(Some(choice));
            }
            self.console.say(&format!(
                "Invalid choice. Please enter a number from 1 to {}.",
                GateChoice::COUNT
            ));
        }
    }
}
