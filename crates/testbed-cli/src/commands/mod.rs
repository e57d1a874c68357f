//! CLI definition and command implementations.

use std::path::PathBuf;

use clap::Parser;

pub mod sync;

/// Merge testbed forks with their upstreams and point their CI at a Cython snapshot.
#[derive(Parser, Debug)]
#[command(name = "testbed-sync", version)]
pub struct Cli {
    /// GitHub user to authenticate as (basic auth together with the token).
    #[arg(long)]
    pub user: Option<String>,

    /// GitHub token [default: $GITHUB_TOKEN, then `gh auth token`, then a prompt].
    #[arg(long)]
    pub token: Option<String>,

    /// Report what would change without merging or writing files.
    #[arg(long, alias = "dry_run")]
    pub dry_run: bool,

    /// Record failures and continue with the next repository.
    #[arg(long)]
    pub keep_going: bool,

    /// Cython commit to point CI configs at [default: head of cython/cython].
    #[arg(long, value_name = "SHA")]
    pub commit: Option<String>,

    /// TOML file overriding the built-in settings.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Only process these repositories.
    #[arg(value_name = "REPO")]
    pub repos: Vec<String>,
}
