//! Driver service that runs both phases over every testbed repository.

use anyhow::{Context, Result};
use testbed_core::{CiConfigRewriter, Config, ErrorLog};
use testbed_github::{GitHubApi, Repository};

use super::ci_config::{CiConfigService, ConfigReport};
use super::upstream::{SyncOutcome, UpstreamService};

/// Options for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Never merge or write files.
    pub dry_run: bool,
    /// Record per-repository failures and move on instead of aborting.
    pub keep_going: bool,
    /// Only process these repositories (all when empty).
    pub repos: Vec<String>,
}

/// Outcome of processing one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoResult {
    /// Both phases ran.
    Processed {
        sync: SyncOutcome,
        config: ConfigReport,
    },
    /// Processing failed and the run kept going.
    Failed(String),
}

/// Report for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub name: String,
    pub result: RepoResult,
}

/// Service orchestrating a run with trait-based dependencies.
pub struct DriverService<'a, H: GitHubApi> {
    client: &'a H,
    config: &'a Config,
    rewriter: &'a CiConfigRewriter,
}

#[allow(clippy::future_not_send)]
impl<'a, H: GitHubApi> DriverService<'a, H> {
    /// Create a new driver service.
    #[must_use]
    pub const fn new(client: &'a H, config: &'a Config, rewriter: &'a CiConfigRewriter) -> Self {
        Self {
            client,
            config,
            rewriter,
        }
    }

    /// Determine the snapshot to point CI configs at.
    ///
    /// An explicit commit wins; otherwise the head of the snapshot
    /// repository is used.
    pub async fn resolve_snapshot(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(sha) = explicit {
            return Ok(sha.to_string());
        }

        let snapshot = &self.config.snapshot;
        self.client
            .list_commits(&snapshot.owner, &snapshot.repo, None, 1)
            .await
            .with_context(|| {
                format!("Failed to get head of {}/{}", snapshot.owner, snapshot.repo)
            })?
            .into_iter()
            .next()
            .map(|c| c.sha)
            .with_context(|| format!("{}/{} has no commits", snapshot.owner, snapshot.repo))
    }

    /// Whether `name` should be processed in this run.
    #[must_use]
    pub fn should_process(&self, name: &str, options: &RunOptions) -> bool {
        !self.config.testbed.is_excluded(name)
            && (options.repos.is_empty() || options.repos.iter().any(|r| r == name))
    }

    /// Process every selected repository of the testbed organization.
    ///
    /// `on_repo` is called after each repository. Problems and, with
    /// `keep_going`, per-repository failures are collected in the returned
    /// log; without `keep_going` the first failure aborts the run.
    pub async fn run(
        &self,
        snapshot: &str,
        options: &RunOptions,
        mut on_repo: impl FnMut(&RepoReport),
    ) -> Result<ErrorLog> {
        let org = &self.config.testbed.org;
        let repos = self
            .client
            .list_org_repos(org)
            .await
            .with_context(|| format!("Failed to list repositories of {org}"))?;

        let mut errors = ErrorLog::new();

        for listed in repos {
            if !self.should_process(&listed.name, options) {
                tracing::debug!(repo = %listed.name, "skipping repository");
                continue;
            }

            let processed = self
                .process(&listed, snapshot, options.dry_run, &mut errors)
                .await;
            let result = match processed {
                Ok((sync, config)) => RepoResult::Processed { sync, config },
                Err(e) if options.keep_going => {
                    let message = format!("{}: {e:#}", listed.name);
                    errors.record(message.clone());
                    RepoResult::Failed(message)
                }
                Err(e) => return Err(e.context(format!("Failed to process {}", listed.name))),
            };

            on_repo(&RepoReport {
                name: listed.name,
                result,
            });
        }

        Ok(errors)
    }

    /// Run both phases for one repository.
    async fn process(
        &self,
        listed: &Repository,
        snapshot: &str,
        dry_run: bool,
        errors: &mut ErrorLog,
    ) -> Result<(SyncOutcome, ConfigReport)> {
        // listings omit the fork parent
        let mut repo = self
            .client
            .get_repo(&listed.owner, &listed.name)
            .await
            .with_context(|| format!("Failed to get {}/{}", listed.owner, listed.name))?;

        let testbed = &self.config.testbed;
        let sync = UpstreamService::new(self.client, &testbed.ci_context, testbed.commit_window)
            .sync(&mut repo, dry_run)
            .await?;

        let config = CiConfigService::new(self.client, testbed, self.rewriter)
            .update(&repo, snapshot, dry_run, errors)
            .await?;

        Ok((sync, config))
    }
}
