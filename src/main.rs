//! cph - Command Entry Point
//!
//! Parses the command line, loads configuration and hands the command to its
//! platform.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cph::{
    cli::{self, Cli},
    config::Config,
    constants::exit_codes,
    state::Harness,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("Error: cannot read the current directory: {}", e);
            return ExitCode::from(exit_codes::FATAL);
        }
    };

    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os().collect(), &cwd));

    let mut config = match Config::from_env(&cwd) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(exit_codes::FATAL);
        }
    };
    cli.apply(&mut config);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(root = %config.root.display(), "configuration loaded");

    let harness = Harness::new(config, cwd);
    match cli.execute(harness).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::debug!(error_code = e.error_code(), "command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
