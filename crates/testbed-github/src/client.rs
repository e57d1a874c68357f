//! GitHub API client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::auth::Auth;
use crate::error::{Error, Result};
use crate::traits::GitHubApi;
use crate::types::{
    Commit, CommitStatus, CreateMerge, FileContents, FileUpdate, MergeResult, RepoRef, Repository,
    StatusState, UpdateFile,
};

/// Largest page size the REST API accepts.
const MAX_PER_PAGE: usize = 100;

// === Internal API response types (shared across methods) ===

/// Internal representation of a repository from the GitHub API.
#[derive(serde::Deserialize)]
struct ApiRepository {
    name: String,
    owner: ApiOwner,
    default_branch: String,
    /// Only present on the single-repository endpoint.
    parent: Option<Box<ApiRepository>>,
}

#[derive(serde::Deserialize)]
struct ApiOwner {
    login: String,
}

impl ApiRepository {
    /// Convert API response to domain type.
    fn into_repository(self) -> Repository {
        Repository {
            name: self.name,
            owner: self.owner.login,
            default_branch: self.default_branch,
            parent: self.parent.map(|p| RepoRef {
                owner: p.owner.login,
                name: p.name,
                default_branch: p.default_branch,
            }),
        }
    }
}

#[derive(serde::Deserialize)]
struct ApiCommit {
    sha: String,
}

#[derive(serde::Deserialize)]
struct ApiStatus {
    context: String,
    state: String,
}

#[derive(serde::Deserialize)]
struct ApiContent {
    path: String,
    sha: String,
    content: Option<String>,
    encoding: Option<String>,
}

impl ApiContent {
    /// Decode the base64 payload into text.
    fn into_file_contents(self) -> Result<FileContents> {
        let decode_error = |reason: String| Error::Decode {
            path: self.path.clone(),
            reason,
        };

        if self.encoding.as_deref() != Some("base64") {
            return Err(decode_error(format!(
                "unsupported encoding {:?}",
                self.encoding.as_deref().unwrap_or("none")
            )));
        }

        // The API wraps the payload at 60 columns.
        let packed: String = self
            .content
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| decode_error(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;

        Ok(FileContents {
            path: self.path,
            sha: self.sha,
            text,
        })
    }
}

#[derive(serde::Deserialize)]
struct ApiContentUpdate {
    commit: ApiCommit,
}

/// GitHub API client.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    /// Set when authenticating with basic auth instead of a bearer token.
    user: Option<String>,
    /// Token stored as `SecretString` for automatic zeroization on drop.
    token: SecretString,
}

impl GitHubClient {
    /// Default GitHub API URL.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    /// Create a new GitHub client.
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn new(auth: &Auth) -> Result<Self> {
        Self::with_base_url(auth, Self::DEFAULT_API_URL)
    }

    /// Create a new GitHub client with a custom API URL (for GitHub Enterprise).
    ///
    /// # Errors
    /// Returns error if authentication fails.
    pub fn with_base_url(auth: &Auth, base_url: impl Into<String>) -> Result<Self> {
        let token = auth.resolve()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("testbed-sync"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: auth.user().map(ToString::to_string),
            token,
        })
    }

    /// Build an authenticated request.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "GitHub API request");

        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, &url);

        match &self.user {
            Some(user) => builder.basic_auth(user, Some(self.token.expose_secret())),
            None => builder.header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            ),
        }
    }

    /// Make a GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;

        Self::handle_response(path, response).await
    }

    /// Make a GET request against a paginated list endpoint, collecting up
    /// to `limit` items.
    async fn get_pages<T: DeserializeOwned>(&self, path: &str, limit: usize) -> Result<Vec<T>> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let separator = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();

        for page in 1.. {
            if items.len() >= limit {
                break;
            }

            let batch: Vec<T> = self
                .get(&format!("{path}{separator}per_page={per_page}&page={page}"))
                .await?;
            let last_page = batch.len() < per_page;
            items.extend(batch);

            if last_page {
                break;
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    /// Make a PUT request.
    async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;

        Self::handle_response(path, response).await
    }

    /// Handle API response.
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.json().await?;
            return Ok(body);
        }

        // Handle error responses
        let status_code = status.as_u16();

        match status_code {
            401 => Err(Error::AuthenticationFailed),
            403 if response
                .headers()
                .get("x-ratelimit-remaining")
                .is_some_and(|v| v == "0") =>
            {
                Err(Error::RateLimited)
            }
            404 => Err(Error::NotFound(path.to_string())),
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(Error::ApiError {
                    status: status_code,
                    message: text,
                })
            }
        }
    }

    // === Repository Operations ===

    /// List every repository of an organization.
    ///
    /// # Errors
    /// Returns error if the organization is not accessible or API call fails.
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        let repos: Vec<ApiRepository> = self
            .get_pages(&format!("/orgs/{org}/repos"), usize::MAX)
            .await?;

        Ok(repos
            .into_iter()
            .map(ApiRepository::into_repository)
            .collect())
    }

    /// Get a single repository, including its fork parent.
    ///
    /// # Errors
    /// Returns error if repository not found or API call fails.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        let api_repo: ApiRepository = self.get(&format!("/repos/{owner}/{repo}")).await?;

        Ok(api_repo.into_repository())
    }

    // === Commit Operations ===

    /// List up to `limit` commits, most recent first.
    ///
    /// # Errors
    /// Returns error if API call fails.
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Commit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let path = branch.map_or_else(
            || format!("/repos/{owner}/{repo}/commits"),
            |b| format!("/repos/{owner}/{repo}/commits?sha={b}"),
        );
        let commits: Vec<ApiCommit> = self.get_pages(&path, limit).await?;

        Ok(commits
            .into_iter()
            .map(|c| Commit { sha: c.sha })
            .collect())
    }

    /// Get the statuses reported for a commit.
    ///
    /// # Errors
    /// Returns error if API call fails.
    pub async fn get_commit_statuses(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        let statuses: Vec<ApiStatus> = self
            .get_pages(&format!("/repos/{owner}/{repo}/commits/{sha}/statuses"), usize::MAX)
            .await?;

        Ok(statuses
            .into_iter()
            .map(|s| CommitStatus {
                context: s.context,
                state: StatusState::parse(&s.state),
            })
            .collect())
    }

    // === Merge Operations ===

    /// Merge a branch or commit into a base branch.
    ///
    /// # Errors
    /// Returns error if the merge conflicts or API call fails.
    pub async fn merge(&self, owner: &str, repo: &str, merge: CreateMerge) -> Result<MergeResult> {
        let path = format!("/repos/{owner}/{repo}/merges");
        let response = self.request(Method::POST, &path).json(&merge).send().await?;

        // 204 means the base already contains the head
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(MergeResult::NothingToMerge);
        }

        let commit: ApiCommit = Self::handle_response(&path, response).await?;
        Ok(MergeResult::Merged { sha: commit.sha })
    }

    // === Content Operations ===

    /// Get and decode a file from the default branch.
    ///
    /// # Errors
    /// Returns error if the file is missing, is not a regular file, or is not UTF-8.
    pub async fn get_contents(&self, owner: &str, repo: &str, path: &str) -> Result<FileContents> {
        let path = path.trim_start_matches('/');
        let content: ApiContent = self
            .get(&format!("/repos/{owner}/{repo}/contents/{path}"))
            .await?;

        content.into_file_contents()
    }

    /// Replace a file's contents.
    ///
    /// # Errors
    /// Returns error if the blob SHA is stale or API call fails.
    pub async fn update_contents(
        &self,
        owner: &str,
        repo: &str,
        update: UpdateFile,
    ) -> Result<FileUpdate> {
        let path = update.path.trim_start_matches('/');
        let response: ApiContentUpdate = self
            .put(&format!("/repos/{owner}/{repo}/contents/{path}"), &update)
            .await?;

        Ok(FileUpdate {
            commit_sha: response.commit.sha,
        })
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("user", &self.user)
            .field("token", &"[redacted]")
            .finish_non_exhaustive()
    }
}

// === Trait Implementation ===

impl GitHubApi for GitHubClient {
    async fn list_org_repos(&self, org: &str) -> Result<Vec<Repository>> {
        self.list_org_repos(org).await
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        self.get_repo(owner, repo).await
    }

    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Commit>> {
        self.list_commits(owner, repo, branch, limit).await
    }

    async fn get_commit_statuses(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Vec<CommitStatus>> {
        self.get_commit_statuses(owner, repo, sha).await
    }

    async fn merge(&self, owner: &str, repo: &str, merge: CreateMerge) -> Result<MergeResult> {
        self.merge(owner, repo, merge).await
    }

    async fn get_contents(&self, owner: &str, repo: &str, path: &str) -> Result<FileContents> {
        self.get_contents(owner, repo, path).await
    }

    async fn update_contents(
        &self,
        owner: &str,
        repo: &str,
        update: UpdateFile,
    ) -> Result<FileUpdate> {
        self.update_contents(owner, repo, update).await
    }
}
