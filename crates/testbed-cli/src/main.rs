//! testbed-sync - Keep the Cython testbed forks merged with upstream and
//! their CI pointed at the Cython snapshot under test.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod services;

use commands::Cli;

fn main() {
    init_tracing();

    let cli = Cli::parse();
    output::set_quiet(cli.quiet);

    if let Err(e) = commands::sync::run(cli) {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
