//! Workflow driver: lookup, first draft, review, save.

use tracing::{error, info, warn};

use super::draft::{RequestDraft, ReviewSession};
use super::{Console, WorkflowError, WorkflowInputs, WorkflowOutcome};
use crate::ai::{ContentGenerator, GenerationOptions, GenerationRequest, PreviousResult};
use crate::editor::{strip_comment_lines, EditorBridge, EditorError};
use crate::provider::{ExistingRequest, RepoProvider};

/// One interactive run over borrowed collaborators.
pub struct Workflow<'a> {
    pub(super) provider: &'a dyn RepoProvider,
    pub(super) generator: &'a dyn ContentGenerator,
    pub(super) editor: &'a dyn EditorBridge,
    pub(super) console: &'a mut dyn Console,
}

impl<'a> Workflow<'a> {
    /// Creates a workflow over the given collaborators.
    pub fn new(
        provider: &'a dyn RepoProvider,
        generator: &'a dyn ContentGenerator,
        editor: &'a dyn EditorBridge,
        console: &'a mut dyn Console,
    ) -> Self {
        Self {
            provider,
            generator,
            editor,
            console,
        }
    }

    /// Runs the workflow to one of its terminal states.
    ///
    /// The provider is mutated at most once, and only when the user saves.
    pub async fn run(&mut self, inputs: &WorkflowInputs) -> Result<WorkflowOutcome, WorkflowError> {
        info!(
            repository = %inputs.repository,
            source = %inputs.source_branch,
            target = %inputs.target_branch,
            provider = self.provider.name(),
            "Starting request workflow"
        );

        let existing = self.lookup_existing(inputs).await;

        let draft = match existing.as_ref() {
            Some(request) => match self.reconcile(inputs, request).await? {
                Some(draft) => draft,
                None => return Ok(self.cancelled()),
            },
            None => self.generate_fresh(inputs).await?,
        };

        let mut session = ReviewSession::new(draft, existing);
        self.review(inputs, &mut session).await
    }

    /// Finds the open request for the branch pair; lookup errors count as none.
    async fn lookup_existing(&mut self, inputs: &WorkflowInputs) -> Option<ExistingRequest> {
        let noun = self.provider.request_noun();
        self.console.say(&format!(
            "🔍 Checking for an existing {noun} from '{}' into '{}'...",
            inputs.source_branch, inputs.target_branch
        ));

        match self
            .provider
            .find_existing_request(
                &inputs.repository,
                &inputs.source_branch,
                &inputs.target_branch,
            )
            .await
        {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Existing request lookup failed, continuing as new");
                self.console.say(&format!(
                    "⚠️  Could not check for an existing {noun}: {e}. A new one will be created."
                ));
                None
            }
        }
    }

    /// Generates a draft with default options. Failure is fatal.
    pub(super) async fn generate_fresh(
        &mut self,
        inputs: &WorkflowInputs,
    ) -> Result<RequestDraft, WorkflowError> {
        let noun = self.provider.request_noun();
        self.console
            .say(&format!("🤖 Generating {noun} title and description..."));

        let options = GenerationOptions::default();
        let request = generation_request(inputs, options.clone());
        match self.generator.generate(&request).await {
            Ok(content) => Ok(RequestDraft::from_generated(content, options)),
            Err(cause) => {
                error!(error = %cause, "Initial generation failed");
                Err(WorkflowError::Generation { noun, cause })
            }
        }
    }

    /// Asks for instructions in the editor and regenerates from `previous`.
    pub(super) async fn generate_seeded(
        &mut self,
        inputs: &WorkflowInputs,
        base: &GenerationOptions,
        previous: PreviousResult,
    ) -> anyhow::Result<RequestDraft> {
        let instructions = self.collect_instructions(&previous.title)?;
        let options = base.seeded(previous, instructions);
        let request = generation_request(inputs, options.clone());

        self.console.say(&format!(
            "🔄 Regenerating {} title and description...",
            self.provider.request_noun()
        ));
        let content = self.generator.generate(&request).await?;
        Ok(RequestDraft::from_generated(content, options))
    }

    fn collect_instructions(&self, current_title: &str) -> Result<String, EditorError> {
        if !self.editor.is_configured() {
            return Err(EditorError::NotConfigured);
        }
        let template = format!(
            "# Describe how the {noun} title and description should change.\n\
             # Lines starting with '#' are ignored. Leave empty for no extra guidance.\n\
             #\n\
             # Current title: {current_title}\n\n",
            noun = self.provider.request_noun()
        );
        let edited = self.editor.edit_buffer(&template, "md")?;
        Ok(strip_comment_lines(&edited))
    }

    pub(super) fn cancelled(&mut self) -> WorkflowOutcome {
        info!("Workflow cancelled by user");
        self.console.say("❌ Operation cancelled by user");
        WorkflowOutcome::Cancelled
    }
}

fn generation_request(inputs: &WorkflowInputs, options: GenerationOptions) -> GenerationRequest {
    GenerationRequest {
        source_branch: inputs.source_branch.clone(),
        target_branch: inputs.target_branch.clone(),
        jira_tickets: inputs.jira_tickets.clone(),
        options,
    }
}
