//! Interactive reconciliation of a generated draft with the remote request.
//!
//! One run looks up an existing request, generates a first draft, lets the
//! user review it and then creates or updates the request at most once.
//! Everything outside the engine is reached through traits: [`RepoProvider`],
//! [`ContentGenerator`], [`EditorBridge`] and [`Console`].
//!
//! [`RepoProvider`]: crate::provider::RepoProvider
//! [`ContentGenerator`]: crate::ai::ContentGenerator
//! [`EditorBridge`]: crate::editor::EditorBridge

pub mod console;
pub mod draft;
pub mod engine;
mod finalize;
pub mod gate;
pub mod review;

#[cfg(test)]
pub(crate) mod test_utils;

use std::io;

use thiserror::Error;

use crate::provider::RequestRecord;

pub use console::{Console, ScriptedConsole, StdConsole};
pub use draft::{RequestDraft, ReviewSession};
pub use engine::Workflow;
pub use gate::GateChoice;
pub use review::ReviewAction;

/// Already-validated inputs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInputs {
    /// Provider-specific repository path, e.g. `owner/repo`.
    pub repository: String,
    /// Branch being merged.
    pub source_branch: String,
    /// Branch merged into.
    pub target_branch: String,
    /// Ticket keys passed to the generator.
    pub jira_tickets: Vec<String>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The request was created or updated.
    Saved(RequestRecord),
    /// The user cancelled; nothing was sent.
    Cancelled,
    /// The provider rejected the save. The message was already shown.
    SaveFailed {
        /// Provider error text.
        error: String,
    },
}

impl WorkflowOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Saved(_) | Self::Cancelled => 0,
            Self::SaveFailed { .. } => 1,
        }
    }
}

/// Fatal workflow errors.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The first draft could not be generated.
    #[error("Failed to generate {noun} content: {cause:#}")]
    Generation {
        /// Provider request noun, e.g. `pull request`.
        noun: &'static str,
        /// Generator failure.
        cause: anyhow::Error,
    },

    /// Reading from or writing to the terminal failed.
    #[error("Console I/O failed: {0}")]
    Console(#[from] io::Error),
}
