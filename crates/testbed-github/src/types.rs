//! GitHub API types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

/// A GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository name (without owner).
    pub name: String,

    /// Owner login (user or organization).
    pub owner: String,

    /// Default branch name.
    pub default_branch: String,

    /// The repository this one was forked from.
    ///
    /// Only populated when the repository is fetched individually;
    /// listing endpoints leave it out.
    pub parent: Option<RepoRef>,
}

/// A reference to another repository, e.g. a fork's parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Owner login.
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Default branch name.
    pub default_branch: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A commit, as returned by the commit history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Commit SHA.
    pub sha: String,
}

/// A commit status reported by an external CI system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    /// Status context, e.g. `continuous-integration/travis-ci/push`.
    pub context: String,

    /// Status state.
    pub state: StatusState,
}

/// State of a commit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusState {
    /// Status check succeeded.
    Success,
    /// Status check is still running.
    Pending,
    /// Status check failed.
    Failure,
    /// Status check errored.
    Error,
    /// A state this client does not know about.
    Other(String),
}

impl StatusState {
    /// Parse a state string from the API.
    #[must_use]
    pub fn parse(state: &str) -> Self {
        match state {
            "success" => Self::Success,
            "pending" => Self::Pending,
            "failure" => Self::Failure,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Request body for merging a head (branch or SHA) into a base branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMerge {
    /// Branch to merge into.
    pub base: String,

    /// Branch name or commit SHA to merge.
    pub head: String,

    /// Commit message (GitHub generates one when omitted).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

/// Outcome of a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult {
    /// A merge commit was created.
    Merged {
        /// SHA of the merge commit.
        sha: String,
    },
    /// The base already contained the head.
    NothingToMerge,
}

/// A decoded file from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// Path of the file within the repository.
    pub path: String,

    /// Blob SHA, required to update the file.
    pub sha: String,

    /// Decoded text content.
    pub text: String,
}

/// Request body for updating a file's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFile {
    /// Path of the file within the repository.
    pub path: String,

    /// Commit message.
    pub message: String,

    /// New content, base64 encoded.
    pub content: String,

    /// Blob SHA of the file being replaced.
    pub sha: String,
}

impl UpdateFile {
    /// Build an update replacing the file whose blob SHA is `sha` with `text`.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        message: impl Into<String>,
        text: &str,
        sha: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            content: STANDARD.encode(text.as_bytes()),
            sha: sha.into(),
        }
    }
}

/// Result of a successful file update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    /// SHA of the commit that wrote the file.
    pub commit_sha: String,
}
