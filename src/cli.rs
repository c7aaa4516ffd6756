//! Command-line interface
//!
//! `cph [--root <dir>] [--time-limit-ms <n>] <platform> <command>`. Every
//! command resolves to one [`Platform`] call; its outcome becomes the exit
//! code.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::{
    config::Config,
    constants::{exit_codes, platforms},
    error::AppResult,
    models::ProblemId,
    platform::{Console, EulerPlatform, KattisPlatform, Platform},
    runner::InputSource,
    services::KattisClient,
    state::Harness,
};

/// Global options that consume the following argument
const VALUE_FLAGS: &[&str] = &["--root", "--time-limit-ms"];

#[derive(Parser, Debug)]
#[command(name = "cph", version)]
#[command(about = "Scaffold, run, test and submit competitive programming solutions")]
pub struct Cli {
    /// Repository root holding the platform directories
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Wall-clock limit per solution run in milliseconds
    #[arg(long, global = true)]
    pub time_limit_ms: Option<u64>,

    #[command(subcommand)]
    pub platform: PlatformCommand,
}

#[derive(Subcommand, Debug)]
pub enum PlatformCommand {
    /// Kattis problems
    Kattis {
        #[command(subcommand)]
        command: ProblemCommand,
    },

    /// Project Euler problems
    Euler {
        #[command(subcommand)]
        command: EulerCommand,
    },
}

/// Commands every platform supports
#[derive(Subcommand, Debug)]
pub enum ProblemCommand {
    /// Create a problem directory from templates
    New {
        /// Problem id
        id: String,
    },

    /// Run the solution once
    Run {
        /// Problem id (defaults to the current directory)
        id: Option<String>,

        /// File fed to the solution as stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run the cases from tests.toml
    Test {
        /// Problem id (defaults to the current directory)
        id: Option<String>,

        /// Only run cases whose name starts with this two-digit index
        #[arg(long)]
        test_id: Option<u32>,

        /// Print a JSON summary instead of the per-case report
        #[arg(long)]
        json: bool,
    },

    /// Submit the solution
    Submit {
        /// Problem id (defaults to the current directory)
        id: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EulerCommand {
    #[command(flatten)]
    Common(ProblemCommand),

    /// Show or record the expected answer in answer.txt
    Answer {
        /// Problem id (defaults to the current directory)
        id: Option<String>,

        /// Record this value as the expected answer
        #[arg(long)]
        set: Option<String>,

        /// Print the recorded answer
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    /// Let command-line flags override the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(limit) = self.time_limit_ms {
            config.execution.time_limit_ms = limit;
        }
    }

    /// Run the selected command, returning the process exit code
    pub async fn execute(self, harness: Harness) -> AppResult<u8> {
        let mut out = std::io::stdout();
        let mut echo = tokio::io::stdout();
        let mut console = Console {
            out: &mut out,
            echo: &mut echo,
        };

        match self.platform {
            PlatformCommand::Kattis { command } => {
                let platform = KattisPlatform::new(harness, Box::new(KattisClient::new()?));
                run_command(&platform, command, &mut console).await
            }
            PlatformCommand::Euler { command } => {
                let platform = EulerPlatform::new(harness);
                match command {
                    EulerCommand::Common(command) => {
                        run_command(&platform, command, &mut console).await
                    }
                    EulerCommand::Answer { id, set, show } => {
                        let problem = platform.resolve_id(id.as_deref())?;
                        platform
                            .answer(&problem, set.as_deref(), show, &mut console)
                            .await?;
                        Ok(exit_codes::SUCCESS)
                    }
                }
            }
        }
    }
}

async fn run_command(
    platform: &dyn Platform,
    command: ProblemCommand,
    console: &mut Console<'_>,
) -> AppResult<u8> {
    match command {
        ProblemCommand::New { id } => {
            let problem = platform.problem(ProblemId::parse(&id)?);
            platform.scaffold(&problem, console).await?;
            Ok(exit_codes::SUCCESS)
        }
        ProblemCommand::Run { id, file } => {
            let problem = platform.resolve_id(id.as_deref())?;
            let input = file.map(InputSource::File).unwrap_or_default();
            let completed = platform.run(&problem, input, console).await?;
            Ok(status(completed))
        }
        ProblemCommand::Test { id, test_id, json } => {
            let problem = platform.resolve_id(id.as_deref())?;
            let report = if json {
                let mut out = std::io::sink();
                let mut echo = tokio::io::sink();
                let mut quiet = Console {
                    out: &mut out,
                    echo: &mut echo,
                };
                let report = platform.test(&problem, test_id, &mut quiet).await?;
                console.say(serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?);
                report
            } else {
                platform.test(&problem, test_id, console).await?
            };
            Ok(status(report.summary.success()))
        }
        ProblemCommand::Submit { id } => {
            let problem = platform.resolve_id(id.as_deref())?;
            let submitted = platform.submit(&problem, console).await?;
            Ok(status(submitted))
        }
    }
}

fn status(success: bool) -> u8 {
    if success {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}

/// Insert the platform name when it was omitted inside a problem directory.
///
/// `cph test` run from `<root>/kattis/hello` becomes `cph kattis test`.
pub fn normalize_args(mut args: Vec<OsString>, cwd: &Path) -> Vec<OsString> {
    let Some(platform) = cwd
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .and_then(|name| platforms::ALL.iter().find(|p| **p == name))
    else {
        return args;
    };

    let mut index = 1;
    while let Some(arg) = args.get(index).and_then(|arg| arg.to_str()) {
        if VALUE_FLAGS.contains(&arg) {
            index += 2;
        } else if matches!(arg, "-h" | "--help" | "-V" | "--version") {
            return args;
        } else if arg.starts_with('-') {
            index += 1;
        } else {
            break;
        }
    }

    let first = match args.get(index) {
        Some(first) => first.to_string_lossy().into_owned(),
        None => return args,
    };
    if platforms::ALL.contains(&first.as_str()) {
        return args;
    }

    tracing::debug!(platform, "inferred platform from working directory");
    args.insert(index, OsString::from(*platform));
    args
}
