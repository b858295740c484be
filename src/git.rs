//! Git plumbing: branches, remotes, change context and ticket discovery.

pub mod changes;
pub mod remote;
pub mod repository;
pub mod tickets;

pub use changes::{BranchChanges, ChangeScope, ChangeSource, GitChangeSource};
pub use remote::{detect_default_branch, RemoteLocation};
pub use repository::{BranchSync, GitRepository};
pub use tickets::{extract_tickets, merge_tickets};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
