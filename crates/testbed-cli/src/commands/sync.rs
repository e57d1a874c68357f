//! `testbed-sync` command - Merge upstream and repoint CI for every testbed.

use anyhow::{Context, Result, bail};
use testbed_core::{CiConfigRewriter, Config};
use testbed_github::{Auth, GitHubClient, SecretString};

use super::Cli;
use crate::output;
use crate::services::{DriverService, RunOptions};

/// Run the sync.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let rewriter = CiConfigRewriter::new(&config.snapshot)?;

    let auth = resolve_auth(cli.user, cli.token)?;
    let client = match &config.github.api_url {
        Some(url) => GitHubClient::with_base_url(&auth, url.as_str()),
        None => GitHubClient::new(&auth),
    }
    .context("Failed to authenticate with GitHub")?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        keep_going: cli.keep_going,
        repos: cli.repos,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let errors = rt.block_on(async {
        let driver = DriverService::new(&client, &config, &rewriter);

        let snapshot = driver.resolve_snapshot(cli.commit.as_deref()).await?;
        output::info(&format!(
            "Pointing {} at Cython {}",
            config.testbed.org,
            output::short_sha(&snapshot)
        ));
        if options.dry_run {
            output::info("Dry run - nothing will be merged or written");
        }

        driver.run(&snapshot, &options, output::repo_report).await
    })?;

    output::error_summary(&errors);
    Ok(())
}

/// Load the config named on the command line, or the built-in defaults.
fn load_config(cli: &Cli) -> Result<Config> {
    let Some(path) = &cli.config else {
        return Ok(Config::default());
    };

    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    Config::load(path).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Pick the credentials to use.
///
/// An explicit token wins, then `GITHUB_TOKEN` and the gh CLI, and finally
/// an interactive prompt.
fn resolve_auth(user: Option<String>, token: Option<String>) -> Result<Auth> {
    let token = match token {
        Some(token) => SecretString::from(token),
        None => match Auth::auto().resolve() {
            Ok(token) => token,
            Err(_) => prompt_token()?,
        },
    };

    Ok(match user {
        Some(user) => Auth::Basic { user, token },
        None => Auth::Token(token),
    })
}

fn prompt_token() -> Result<SecretString> {
    let token = inquire::Password::new("GitHub token:")
        .without_confirmation()
        .prompt()
        .context("No GitHub token available - pass --token or set GITHUB_TOKEN")?;

    Ok(SecretString::from(token))
}
