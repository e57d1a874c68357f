//! # testbed-github
//!
//! GitHub API integration for testbed-sync: organization repository
//! listing, commit history and statuses, branch merges, and reading and
//! writing repository file contents.
//!
//! # Security
//!
//! Authentication tokens are stored using `SecretString` which automatically
//! zeroizes memory when dropped, reducing credential exposure in memory dumps.

mod auth;
mod client;
mod error;
mod traits;
mod types;

pub use auth::Auth;
pub use client::GitHubClient;
pub use error::{Error, Result};
pub use traits::GitHubApi;
// Re-export SecretString for constructing Auth::Token
pub use secrecy::SecretString;
pub use types::{
    Commit, CommitStatus, CreateMerge, FileContents, FileUpdate, MergeResult, RepoRef,
    Repository, StatusState, UpdateFile,
};
