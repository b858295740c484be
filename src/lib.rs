//! # pr-scribe
//!
//! Generates pull request (GitHub) and merge request (GitLab) titles and
//! descriptions with an AI model, lets the user review them interactively
//! and then creates or updates the request.
//!
//! The interactive part lives in [`workflow`] and talks to the outside world
//! only through the [`provider::RepoProvider`], [`ai::ContentGenerator`],
//! [`editor::EditorBridge`] and [`workflow::Console`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod config;
pub mod data;
pub mod editor;
pub mod git;
pub mod provider;
pub mod utils;
pub mod workflow;

pub use crate::cli::Cli;

/// The current version of pr-scribe.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
