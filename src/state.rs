//! Shared harness state
//!
//! Every platform is built around one [`Harness`]: the loaded configuration,
//! the solution runner and the directory the command was started from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::runner::Runner;

/// Shared harness state
#[derive(Clone)]
pub struct Harness {
    inner: Arc<HarnessInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct HarnessInner {
    /// Harness configuration
    config: Config,

    /// Runner for solution subprocesses
    runner: Runner,

    /// Working directory used to infer omitted problem ids
    cwd: PathBuf,
}

impl Harness {
    /// Create a new harness
    pub fn new(config: Config, cwd: PathBuf) -> Self {
        let runner = Runner::new(config.execution.clone());
        Self {
            inner: Arc::new(HarnessInner {
                config,
                runner,
                cwd,
            }),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the solution runner
    pub fn runner(&self) -> &Runner {
        &self.inner.runner
    }

    pub fn cwd(&self) -> &Path {
        &self.inner.cwd
    }
}
