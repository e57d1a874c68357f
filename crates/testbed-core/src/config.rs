//! Configuration management for testbed-sync.
//!
//! Every setting has a built-in default, so a config file is optional and
//! only needs to name the values it changes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// testbed-sync configuration, optionally loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// GitHub-specific settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Which testbed repositories to process and how.
    #[serde(default)]
    pub testbed: TestbedConfig,

    /// Where the snapshot under test comes from and how CI configs pin it.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// A missing file yields the defaults. Per-repository config paths
    /// from the file are merged over the built-in table.
    ///
    /// # Errors
    /// Returns error if file can't be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    /// Returns error if the text can't be parsed or validated.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;

        for (repo, path) in default_config_paths() {
            config.testbed.config_paths.entry(repo).or_insert(path);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.testbed.org.is_empty() {
            return Err(Error::InvalidConfig {
                key: "testbed.org",
                reason: "must not be empty".into(),
            });
        }
        if self.testbed.commit_window == 0 {
            return Err(Error::InvalidConfig {
                key: "testbed.commit_window",
                reason: "must be at least 1".into(),
            });
        }
        if self.snapshot.archive_marker.is_empty() {
            return Err(Error::InvalidConfig {
                key: "snapshot.archive_marker",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// GitHub-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GitHubConfig {
    /// Custom API URL for GitHub Enterprise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Settings for the testbed organization and its repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestbedConfig {
    /// Organization holding the testbed forks.
    #[serde(default = "default_org")]
    pub org: String,

    /// Repositories in the organization that are never processed.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// How many upstream commits to search for a good one.
    #[serde(default = "default_commit_window")]
    pub commit_window: usize,

    /// Substring identifying the CI system's status context.
    #[serde(default = "default_ci_context")]
    pub ci_context: String,

    /// CI config path used when a repository has no entry in `config_paths`.
    #[serde(default = "default_config_path")]
    pub default_config_path: String,

    /// Per-repository CI config paths.
    #[serde(default = "default_config_paths")]
    pub config_paths: BTreeMap<String, String>,
}

impl TestbedConfig {
    /// Whether `repo` is on the exclusion list.
    #[must_use]
    pub fn is_excluded(&self, repo: &str) -> bool {
        self.exclude.iter().any(|r| r == repo)
    }

    /// CI config path for `repo`.
    #[must_use]
    pub fn config_path_for(&self, repo: &str) -> &str {
        self.config_paths
            .get(repo)
            .map_or(self.default_config_path.as_str(), String::as_str)
    }
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            org: default_org(),
            exclude: default_exclude(),
            commit_window: default_commit_window(),
            ci_context: default_ci_context(),
            default_config_path: default_config_path(),
            config_paths: default_config_paths(),
        }
    }
}

fn default_org() -> String {
    "cython-testbed".into()
}

fn default_exclude() -> Vec<String> {
    vec!["cython".into(), "cython-release-scripts".into()]
}

const fn default_commit_window() -> usize {
    25
}

fn default_ci_context() -> String {
    "/travis-ci/".into()
}

fn default_config_path() -> String {
    ".travis.yml".into()
}

fn default_config_paths() -> BTreeMap<String, String> {
    [
        ("grpc", "tools/run_tests/build_python.sh"),
        ("scikit-learn", "build_tools/travis/install.sh"),
        ("scikit-image", "tools/travis/before_install.sh"),
        ("pandas", "ci/install_travis.sh"),
        ("uvloop", ".ci/travis-install.sh"),
        ("arrow", "ci/travis_script_python.sh"),
    ]
    .into_iter()
    .map(|(repo, path)| (repo.to_string(), path.to_string()))
    .collect()
}

/// Settings for the snapshot under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Owner of the repository whose head commit is the default snapshot.
    #[serde(default = "default_snapshot_owner")]
    pub owner: String,

    /// Repository whose head commit is the default snapshot.
    #[serde(default = "default_snapshot_repo")]
    pub repo: String,

    /// Prefix of the pinned archive URL path, e.g. `cython/archive`.
    #[serde(default = "default_archive_marker")]
    pub archive_marker: String,

    /// Build flag every testbed CI config is expected to pass.
    #[serde(default = "default_compile_flag")]
    pub compile_flag: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            owner: default_snapshot_owner(),
            repo: default_snapshot_repo(),
            archive_marker: default_archive_marker(),
            compile_flag: default_compile_flag(),
        }
    }
}

fn default_snapshot_owner() -> String {
    "cython".into()
}

fn default_snapshot_repo() -> String {
    "cython".into()
}

fn default_archive_marker() -> String {
    "cython/archive".into()
}

fn default_compile_flag() -> String {
    "--no-cython-compile".into()
}
