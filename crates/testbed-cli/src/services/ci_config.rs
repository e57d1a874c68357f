//! CI config service for repointing a testbed at the snapshot under test.

use anyhow::Result;
use testbed_core::{CiConfigRewriter, ErrorLog};
use testbed_core::config::TestbedConfig;
use testbed_github::{GitHubApi, Repository, UpdateFile};

/// What happened to a repository's CI config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// The config could not be fetched or decoded.
    Unreadable,
    /// The config does not install a snapshot archive.
    NotPinned,
    /// The config already points at the snapshot.
    UpToDate,
    /// The config was rewritten.
    Updated { commit_sha: String },
    /// Dry run: the config would have been rewritten.
    WouldUpdate,
    /// GitHub rejected the write.
    WriteFailed,
}

/// Result of the config phase for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    /// Path of the CI config within the repository.
    pub path: String,
    /// What happened.
    pub outcome: ConfigOutcome,
    /// Problems found, also recorded in the run's error log.
    pub problems: Vec<String>,
}

impl ConfigReport {
    fn new(path: &str, outcome: ConfigOutcome, problems: Vec<String>) -> Self {
        Self {
            path: path.to_string(),
            outcome,
            problems,
        }
    }
}

/// Record `problem` in the run's log as soon as it is found.
fn note(errors: &mut ErrorLog, problems: &mut Vec<String>, problem: String) {
    errors.record(problem.clone());
    problems.push(problem);
}

/// Service for the config phase with trait-based dependencies.
pub struct CiConfigService<'a, H: GitHubApi> {
    client: &'a H,
    testbed: &'a TestbedConfig,
    rewriter: &'a CiConfigRewriter,
}

#[allow(clippy::future_not_send)]
impl<'a, H: GitHubApi> CiConfigService<'a, H> {
    /// Create a new CI config service.
    #[must_use]
    pub const fn new(
        client: &'a H,
        testbed: &'a TestbedConfig,
        rewriter: &'a CiConfigRewriter,
    ) -> Self {
        Self {
            client,
            testbed,
            rewriter,
        }
    }

    /// Point `repo`'s CI config at `snapshot`.
    ///
    /// Problems with the config itself, and rejected writes, are recorded
    /// in `errors` as they are found and repeated in the returned
    /// [`ConfigReport`]. Only transport failures are errors.
    pub async fn update(
        &self,
        repo: &Repository,
        snapshot: &str,
        dry_run: bool,
        errors: &mut ErrorLog,
    ) -> Result<ConfigReport> {
        let path = self.testbed.config_path_for(&repo.name);
        let mut problems = Vec::new();

        let file = match self.client.get_contents(&repo.owner, &repo.name, path).await {
            Ok(file) => file,
            Err(e) => {
                let e = anyhow::Error::from(e);
                let problem = format!("No CI configuration for {} ({e:#})", repo.name);
                note(errors, &mut problems, problem);
                return Ok(ConfigReport::new(path, ConfigOutcome::Unreadable, problems));
            }
        };

        let check = self.rewriter.check(&file.text);
        if !check.has_archive {
            let problem = format!(
                "CI configuration for {} doesn't point to a {} snapshot",
                repo.name,
                self.rewriter.archive_marker()
            );
            note(errors, &mut problems, problem);
            return Ok(ConfigReport::new(path, ConfigOutcome::NotPinned, problems));
        }

        if !check.has_compile_flag {
            let problem = format!(
                "CI configuration for {} doesn't specify {}",
                repo.name,
                self.rewriter.compile_flag()
            );
            note(errors, &mut problems, problem);
        }

        let Some(updated) = self.rewriter.rewrite(&file.text, snapshot) else {
            return Ok(ConfigReport::new(path, ConfigOutcome::UpToDate, problems));
        };

        if dry_run {
            return Ok(ConfigReport::new(path, ConfigOutcome::WouldUpdate, problems));
        }

        let update = UpdateFile::new(
            path,
            format!("Update CI config to point to Cython at {snapshot}."),
            &updated,
            file.sha,
        );

        let outcome = match self
            .client
            .update_contents(&repo.owner, &repo.name, update)
            .await
        {
            Ok(written) => ConfigOutcome::Updated {
                commit_sha: written.commit_sha,
            },
            Err(e) if e.status().is_some() => {
                let problem = format!("Error updating CI pointer for {}: {e}", repo.name);
                note(errors, &mut problems, problem);
                ConfigOutcome::WriteFailed
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ConfigReport::new(path, outcome, problems))
    }
}
