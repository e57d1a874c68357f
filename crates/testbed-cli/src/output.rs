//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use testbed_core::ErrorLog;
use testbed_github::MergeResult;

use crate::services::{ConfigOutcome, ConfigReport, RepoReport, RepoResult, SyncOutcome};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a repository heading (suppressed in quiet mode).
pub fn heading(name: &str) {
    if !is_quiet() {
        println!();
        println!("{}", name.bold());
    }
}

/// Short form of a commit SHA for display.
#[must_use]
pub fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

/// Print what happened to one repository.
pub fn repo_report(report: &RepoReport) {
    heading(&report.name);

    match &report.result {
        RepoResult::Processed { sync, config } => {
            sync_outcome(sync);
            config_report(config);
        }
        RepoResult::Failed(message) => error(message),
    }
}

fn sync_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::NoGoodCommit => warn("Unable to find good commit."),
        SyncOutcome::UpToDate => success("Up to date with upstream."),
        SyncOutcome::Merged {
            sha,
            base,
            result: MergeResult::Merged { sha: merge_sha },
        } => {
            success(&format!(
                "Merged {} into {base} ({})",
                short_sha(sha),
                short_sha(merge_sha)
            ));
        }
        SyncOutcome::Merged {
            base,
            result: MergeResult::NothingToMerge,
            ..
        } => success(&format!("{base} already contains upstream")),
        SyncOutcome::WouldMerge { sha, base } => {
            info(&format!("Would merge {} into {base} (dry run)", short_sha(sha)));
        }
    }
}

fn config_report(report: &ConfigReport) {
    for problem in &report.problems {
        error(problem);
    }

    match &report.outcome {
        ConfigOutcome::UpToDate => success("Already up to date."),
        ConfigOutcome::Updated { commit_sha } => {
            success(&format!(
                "Updated CI config at {} ({})",
                report.path,
                short_sha(commit_sha)
            ));
        }
        ConfigOutcome::WouldUpdate => {
            info(&format!("Would update CI config at {} (dry run)", report.path));
        }
        // the problem lines already say what went wrong
        ConfigOutcome::Unreadable | ConfigOutcome::NotPinned | ConfigOutcome::WriteFailed => {}
    }
}

/// Print the end-of-run error summary (always prints, nothing when empty).
pub fn error_summary(errors: &ErrorLog) {
    if errors.is_empty() {
        return;
    }

    println!();
    println!("{}", "ERRORS".red().bold());
    for message in errors.iter() {
        println!("{message}");
    }
}
