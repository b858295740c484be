//! The single place where the provider is mutated.

use tracing::{error, info};

use super::draft::ReviewSession;
use super::{Workflow, WorkflowInputs, WorkflowOutcome};

impl Workflow<'_> {
    /// Creates or updates the request from the live draft.
    ///
    /// Updates when the session holds an existing request, creates otherwise.
    /// Provider errors end the run as [`WorkflowOutcome::SaveFailed`].
    pub(super) async fn finalize(
        &mut self,
        inputs: &WorkflowInputs,
        session: &ReviewSession,
    ) -> WorkflowOutcome {
        let noun = self.provider.request_noun();
        let draft = session.draft();

        let (verb, result) = match session.existing() {
            Some(existing) => {
                self.console.say(&format!(
                    "💾 Updating {noun} {}...",
                    self.provider.request_ref(existing.id)
                ));
                let result = self
                    .provider
                    .update_request(
                        &inputs.repository,
                        existing.id,
                        &draft.title,
                        &draft.description,
                    )
                    .await;
                ("update", result)
            }
            None => {
                self.console.say(&format!("💾 Creating {noun}..."));
                let result = self
                    .provider
                    .create_request(
                        &inputs.repository,
                        &inputs.source_branch,
                        &inputs.target_branch,
                        &draft.title,
                        &draft.description,
                    )
                    .await;
                ("create", result)
            }
        };

        match result {
            Ok(record) => {
                info!(id = record.id, url = %record.url, "Request saved");
                let done = if verb == "update" { "Updated" } else { "Created" };
                self.console.say(&format!(
                    "✅ {done} {noun} {}: {}",
                    self.provider.request_ref(record.id),
                    record.url
                ));
                WorkflowOutcome::Saved(record)
            }
            Err(e) => {
                error!(error = %e, "Failed to {verb} request");
                self.console
                    .say(&format!("❌ Failed to {verb} {noun}: {e}"));
                WorkflowOutcome::SaveFailed {
                    error: e.to_string(),
                }
            }
        }
    }
}
