//! CLI interface for pr-scribe.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod create;

/// pr-scribe: AI-written pull and merge request descriptions.
#[derive(Parser)]
#[command(name = "pr-scribe")]
#[command(about = "Generate, review and publish pull/merge request descriptions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Creates or updates the request for the current branch.
    Create(create::CreateCommand),
    /// Configuration inspection.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command and returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        match self.command {
            Commands::Create(create_cmd) => create_cmd.execute().await,
            Commands::Config(config_cmd) => config_cmd.execute().map(|()| 0),
        }
    }
}
