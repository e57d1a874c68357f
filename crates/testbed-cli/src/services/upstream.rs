//! Upstream service for merging a fork's latest good upstream commit.
//!
//! A "good" commit is one the upstream CI has passed; merging only those
//! keeps testbed failures attributable to the Cython snapshot under test.

use anyhow::{Context, Result, bail};
use testbed_github::{
    CommitStatus, CreateMerge, GitHubApi, MergeResult, RepoRef, Repository, StatusState,
};

/// What the sync phase found or did for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No commit in the upstream window passed CI.
    NoGoodCommit,
    /// The fork's head already is the upstream good commit.
    UpToDate,
    /// The upstream good commit was merged into the fork.
    Merged {
        sha: String,
        base: String,
        result: MergeResult,
    },
    /// Dry run: the upstream good commit would have been merged.
    WouldMerge { sha: String, base: String },
}

/// Whether any status comes from the CI system and succeeded.
#[must_use]
pub fn is_good_commit(statuses: &[CommitStatus], ci_context: &str) -> bool {
    statuses
        .iter()
        .any(|s| s.context.contains(ci_context) && s.state == StatusState::Success)
}

/// Service for the sync phase with trait-based dependencies.
pub struct UpstreamService<'a, H: GitHubApi> {
    client: &'a H,
    ci_context: &'a str,
    commit_window: usize,
}

#[allow(clippy::future_not_send)]
impl<'a, H: GitHubApi> UpstreamService<'a, H> {
    /// Create a new upstream service.
    #[must_use]
    pub const fn new(client: &'a H, ci_context: &'a str, commit_window: usize) -> Self {
        Self {
            client,
            ci_context,
            commit_window,
        }
    }

    /// Find the most recent upstream commit that passed CI.
    ///
    /// Statuses are fetched one commit at a time, newest first, and the
    /// search stops at the first good commit.
    pub async fn find_good_commit(&self, upstream: &RepoRef) -> Result<Option<String>> {
        let commits = self
            .client
            .list_commits(
                &upstream.owner,
                &upstream.name,
                Some(&upstream.default_branch),
                self.commit_window,
            )
            .await
            .with_context(|| format!("Failed to list commits of {upstream}"))?;

        for commit in commits {
            let statuses = self
                .client
                .get_commit_statuses(&upstream.owner, &upstream.name, &commit.sha)
                .await
                .with_context(|| format!("Failed to get statuses of {upstream}@{}", commit.sha))?;

            if is_good_commit(&statuses, self.ci_context) {
                return Ok(Some(commit.sha));
            }
        }

        Ok(None)
    }

    /// Merge the upstream good commit into the fork's default branch if the
    /// fork's head differs from it.
    ///
    /// After a merge `repo` is refreshed from the API.
    pub async fn sync(&self, repo: &mut Repository, dry_run: bool) -> Result<SyncOutcome> {
        let Some(upstream) = repo.parent.clone() else {
            bail!("{}/{} is not a fork - no upstream to sync from", repo.owner, repo.name);
        };

        let head = self
            .client
            .list_commits(&repo.owner, &repo.name, Some(&repo.default_branch), 1)
            .await
            .with_context(|| format!("Failed to get head of {}/{}", repo.owner, repo.name))?
            .into_iter()
            .next()
            .with_context(|| format!("{}/{} has no commits", repo.owner, repo.name))?;

        let Some(good) = self.find_good_commit(&upstream).await? else {
            return Ok(SyncOutcome::NoGoodCommit);
        };

        if head.sha == good {
            return Ok(SyncOutcome::UpToDate);
        }

        let base = repo.default_branch.clone();
        if dry_run {
            return Ok(SyncOutcome::WouldMerge { sha: good, base });
        }

        let result = self
            .client
            .merge(
                &repo.owner,
                &repo.name,
                CreateMerge {
                    base: base.clone(),
                    head: good.clone(),
                    commit_message: None,
                },
            )
            .await
            .with_context(|| format!("Failed to merge {good} into {base}"))?;

        let refreshed = self.client.get_repo(&repo.owner, &repo.name).await?;
        *repo = refreshed;

        Ok(SyncOutcome::Merged {
            sha: good,
            base,
            result,
        })
    }
}
