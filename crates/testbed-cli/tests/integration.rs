//! Integration tests for the testbed-sync CLI.
//!
//! These tests run the binary end-to-end against a mock GitHub API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORK_HEAD: &str = "f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0";
const UPSTREAM_GOOD: &str = "0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a";
const SNAPSHOT: &str = "c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1";

/// `install: pip install cython/archive/old.zip --no-cython-compile\n`, base64.
const PINNED_BASE64: &str =
    "aW5zdGFsbDogcGlwIGluc3RhbGwgY3l0aG9uL2FyY2hpdmUvb2xkLnppcCAtLW5vLWN5dGhvbi1jb21waWxlCg==";

/// Write a config file pointing the CLI at the mock server.
fn write_config(server: &MockServer) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp.path().join("testbed.toml"),
        format!("[github]\napi_url = \"{}\"\n", server.uri()),
    )
    .expect("Failed to write config");
    temp
}

/// Command for the binary, authenticated and configured for the mock server.
fn testbed_sync(config: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("testbed-sync").expect("binary exists");
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--token")
        .arg("test-token")
        .arg("--config")
        .arg(config.path().join("testbed.toml"))
        .arg("--commit")
        .arg(SNAPSHOT);
    cmd
}

fn repo_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "owner": { "login": "cython-testbed" },
        "default_branch": "main",
        "fork": true,
        "parent": {
            "name": name,
            "owner": { "login": name },
            "default_branch": "main",
        },
    })
}

/// Mount a fork that is behind its upstream and whose config pins `old`.
async fn mount_behind_fork(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/cython-testbed/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(repo_json(name)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/cython-testbed/{name}/commits")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "sha": FORK_HEAD }])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{name}/{name}/commits")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "sha": UPSTREAM_GOOD }])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/repos/{name}/{name}/commits/{UPSTREAM_GOOD}/statuses"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "context": "continuous-integration/travis-ci/push", "state": "success" },
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/repos/cython-testbed/{name}/contents/.travis.yml"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": ".travis.yml",
            "sha": "blob-sha",
            "encoding": "base64",
            "content": PINNED_BASE64,
        })))
        .mount(server)
        .await;
}

async fn mount_org(server: &MockServer, names: &[&str]) {
    let repos: Vec<_> = names.iter().map(|n| repo_json(n)).collect();
    Mock::given(method("GET"))
        .and(path("/orgs/cython-testbed/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(repos))
        .mount(server)
        .await;
}

async fn forbid_mutations(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("testbed-sync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--keep-going"))
        .stdout(predicate::str::contains("--commit"))
        .stdout(predicate::str::contains("[REPO]"));
}

#[test]
fn test_missing_config_file_fails() {
    Command::cargo_bin("testbed-sync")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["--token", "t", "--config", "/nonexistent/testbed.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_reports_without_mutating() {
    let server = MockServer::start().await;
    mount_org(&server, &["cython", "numpy"]).await;
    mount_behind_fork(&server, "numpy").await;
    forbid_mutations(&server).await;
    let config = write_config(&server);

    testbed_sync(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("numpy"))
        .stdout(predicate::str::contains("Would merge 0a0a0a0a0a0a into main"))
        .stdout(predicate::str::contains(
            "Would update CI config at .travis.yml",
        ))
        .stdout(predicate::str::contains("ERRORS").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_merges_and_writes_config() {
    let server = MockServer::start().await;
    mount_org(&server, &["numpy"]).await;
    mount_behind_fork(&server, "numpy").await;

    Mock::given(method("POST"))
        .and(path("/repos/cython-testbed/numpy/merges"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "sha": "m3m3m3m3m3m3m3" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/cython-testbed/numpy/contents/.travis.yml"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "commit": { "sha": "u4u4u4u4u4u4u4" },
        })))
        .expect(1)
        .mount(&server)
        .await;
    let config = write_config(&server);

    testbed_sync(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 0a0a0a0a0a0a into main"))
        .stdout(predicate::str::contains("Updated CI config at .travis.yml"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_filter_limits_processing() {
    let server = MockServer::start().await;
    mount_org(&server, &["numpy", "scipy"]).await;
    mount_behind_fork(&server, "numpy").await;
    // scipy must never be fetched
    Mock::given(path_regex("^/repos/(cython-testbed/)?scipy"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    forbid_mutations(&server).await;
    let config = write_config(&server);

    testbed_sync(&config)
        .args(["--dry-run", "numpy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would merge"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_keep_going_summarizes_failures() {
    let server = MockServer::start().await;
    mount_org(&server, &["broken", "numpy"]).await;
    Mock::given(method("GET"))
        .and(path("/repos/cython-testbed/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    mount_behind_fork(&server, "numpy").await;
    forbid_mutations(&server).await;
    let config = write_config(&server);

    testbed_sync(&config)
        .args(["--dry-run", "--keep-going"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would update CI config"))
        .stdout(predicate::str::contains("ERRORS"))
        .stdout(predicate::str::contains("broken: "));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failure_aborts_without_keep_going() {
    let server = MockServer::start().await;
    mount_org(&server, &["broken", "numpy"]).await;
    Mock::given(method("GET"))
        .and(path("/repos/cython-testbed/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(path_regex("^/repos/(cython-testbed/)?numpy"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let config = write_config(&server);

    testbed_sync(&config)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process broken"));
}
