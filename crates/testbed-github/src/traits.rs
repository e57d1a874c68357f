//! Trait abstractions for GitHub API operations.
//!
//! This module defines the `GitHubApi` trait which abstracts GitHub API operations,
//! enabling dependency injection and testability.

use crate::{
    Commit, CommitStatus, CreateMerge, FileContents, FileUpdate, MergeResult, Repository, Result,
    UpdateFile,
};

/// Trait for GitHub API operations.
///
/// This trait abstracts GitHub API calls, allowing for:
/// - Dependency injection in services
/// - Mock implementations for testing
///
/// All repository-scoped methods take `owner` and `repo` as parameters, since
/// a single run touches forks, their parents, and the snapshot repository.
pub trait GitHubApi: Send + Sync {
    // === Repository Operations ===

    /// List every repository of an organization (all pages).
    fn list_org_repos(
        &self,
        org: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Repository>>> + Send;

    /// Get a single repository, including its fork parent.
    fn get_repo(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = Result<Repository>> + Send;

    // === Commit Operations ===

    /// List up to `limit` commits, most recent first.
    ///
    /// When `branch` is `None` the repository's default branch is used.
    fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Commit>>> + Send;

    /// Get the statuses reported for a commit.
    fn get_commit_statuses(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> impl std::future::Future<Output = Result<Vec<CommitStatus>>> + Send;

    // === Merge Operations ===

    /// Merge a branch or commit into a base branch.
    fn merge(
        &self,
        owner: &str,
        repo: &str,
        merge: CreateMerge,
    ) -> impl std::future::Future<Output = Result<MergeResult>> + Send;

    // === Content Operations ===

    /// Get and decode a file from the default branch.
    fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> impl std::future::Future<Output = Result<FileContents>> + Send;

    /// Replace a file's contents.
    fn update_contents(
        &self,
        owner: &str,
        repo: &str,
        update: UpdateFile,
    ) -> impl std::future::Future<Output = Result<FileUpdate>> + Send;
}
