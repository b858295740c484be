//! Configuration-related CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ConfigLoader;
use crate::git::GitRepository;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the merged configuration and where it was read from.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        // Outside a repository only the global file and ./.pr-scribe apply.
        let root = match GitRepository::open() {
            Ok(repo) => repo.root().to_path_buf(),
            Err(_) => PathBuf::from("."),
        };
        let loader = ConfigLoader::new(&root);
        let config = loader.load()?;

        match loader.global_path() {
            Some(path) => println!("🌐 Global config: {}", describe_path(path)),
            None => println!("🌐 Global config: (no home directory)"),
        }
        println!("📁 Local config:  {}", describe_path(loader.local_path()));
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
        );
        Ok(())
    }
}

fn describe_path(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
