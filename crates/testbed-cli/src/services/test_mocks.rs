//! Mock implementations for testing services.
//!
//! `MockGitHub` implements `GitHubApi` in memory and records every mutating
//! call, so services can be tested without a GitHub server.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use testbed_github::{
    Commit, CommitStatus, CreateMerge, Error, FileContents, FileUpdate, GitHubApi, MergeResult,
    RepoRef, Repository, Result, StatusState, UpdateFile,
};

/// A testbed fork in `cython-testbed` whose upstream is `<name>/<name>`.
pub fn fork(name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        owner: "cython-testbed".to_string(),
        default_branch: "main".to_string(),
        parent: Some(RepoRef {
            owner: name.to_string(),
            name: name.to_string(),
            default_branch: "main".to_string(),
        }),
    }
}

/// Mock implementation of `GitHubApi` for testing.
#[derive(Default)]
pub struct MockGitHub {
    repos: Mutex<Vec<Repository>>,
    failing_repos: Mutex<HashSet<String>>,
    commits: Mutex<HashMap<String, Vec<String>>>,
    statuses: Mutex<HashMap<String, Vec<CommitStatus>>>,
    files: Mutex<HashMap<(String, String), String>>,
    update_failures: Mutex<HashMap<String, u16>>,
    connection_resets: Mutex<HashSet<String>>,
    status_requests: Mutex<Vec<String>>,
    merges: Mutex<Vec<(String, CreateMerge)>>,
    updates: Mutex<Vec<(String, UpdateFile)>>,
}

#[allow(clippy::unwrap_used)]
impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a repository to the organization.
    pub fn with_repo(self, repo: Repository) -> Self {
        self.repos.lock().unwrap().push(repo);
        self
    }

    /// Make fetching `name` fail with a server error.
    pub fn with_failing_repo(self, name: &str) -> Self {
        self.failing_repos.lock().unwrap().insert(name.to_string());
        self
    }

    /// Set the history of `full_name` (`owner/repo`), newest first.
    pub fn with_commits(self, full_name: &str, shas: &[&str]) -> Self {
        self.commits.lock().unwrap().insert(
            full_name.to_string(),
            shas.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Attach a status to a commit.
    pub fn with_status(self, sha: &str, context: &str, state: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .entry(sha.to_string())
            .or_default()
            .push(CommitStatus {
                context: context.to_string(),
                state: StatusState::parse(state),
            });
        self
    }

    /// Add a file to a repository. Its blob SHA is `blob-<path>`.
    pub fn with_file(self, repo: &str, path: &str, text: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert((repo.to_string(), path.to_string()), text.to_string());
        self
    }

    /// Make file updates in `repo` fail with `status`.
    pub fn with_update_failure(self, repo: &str, status: u16) -> Self {
        self.update_failures
            .lock()
            .unwrap()
            .insert(repo.to_string(), status);
        self
    }

    /// Make file updates in `repo` fail before any response arrives.
    pub fn with_connection_reset(self, repo: &str) -> Self {
        self.connection_resets
            .lock()
            .unwrap()
            .insert(repo.to_string());
        self
    }

    /// Commits whose statuses were requested, in order.
    pub fn status_requests(&self) -> Vec<String> {
        self.status_requests.lock().unwrap().clone()
    }

    /// Merges issued, as `(repo, request)`.
    pub fn merges(&self) -> Vec<(String, CreateMerge)> {
        self.merges.lock().unwrap().clone()
    }

    /// File updates issued, as `(repo, request)`.
    pub fn updates(&self) -> Vec<(String, UpdateFile)> {
        self.updates.lock().unwrap().clone()
    }
}

#[allow(clippy::unwrap_used)]
impl GitHubApi for MockGitHub {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        Ok(self
            .repos
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner == org)
            // listings never carry the parent
            .map(|r| Repository {
                parent: None,
                ..r.clone()
            })
            .collect())
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        if self.failing_repos.lock().unwrap().contains(repo) {
            return Err(Error::ApiError {
                status: 500,
                message: "Server Error".into(),
            });
        }

        self.repos
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.owner == owner && r.name == repo)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("/repos/{owner}/{repo}")))
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        _branch: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Commit>> {
        Ok(self
            .commits
            .lock()
            .unwrap()
            .get(&format!("{owner}/{repo}"))
            .map(|shas| {
                shas.iter()
                    .take(limit)
                    .map(|sha| Commit { sha: sha.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_commit_statuses(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        self.status_requests.lock().unwrap().push(sha.to_string());
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge(&self, _owner: &str, repo: &str, merge: CreateMerge) -> Result<MergeResult> {
        self.merges.lock().unwrap().push((repo.to_string(), merge));
        Ok(MergeResult::Merged {
            sha: "merge-commit".into(),
        })
    }

    async fn get_contents(&self, owner: &str, repo: &str, path: &str) -> Result<FileContents> {
        self.files
            .lock()
            .unwrap()
            .get(&(repo.to_string(), path.to_string()))
            .map(|text| FileContents {
                path: path.to_string(),
                sha: format!("blob-{path}"),
                text: text.clone(),
            })
            .ok_or_else(|| Error::NotFound(format!("/repos/{owner}/{repo}/contents/{path}")))
    }

    async fn update_contents(
        &self,
        _owner: &str,
        repo: &str,
        update: UpdateFile,
    ) -> Result<FileUpdate> {
        if self.connection_resets.lock().unwrap().contains(repo) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }

        if let Some(&status) = self.update_failures.lock().unwrap().get(repo) {
            return Err(Error::ApiError {
                status,
                message: r#"{"message":"sha does not match"}"#.into(),
            });
        }

        self.updates.lock().unwrap().push((repo.to_string(), update));
        Ok(FileUpdate {
            commit_sha: "update-commit".into(),
        })
    }
}
