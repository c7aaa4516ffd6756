//! Harness configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables (optionally seeded from a `.env` file) and from the Kattis
//! credentials file. Command-line flags override the environment in `main`.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_OUTPUT_LIMIT_BYTES, DEFAULT_PYTHON, DEFAULT_TIME_LIMIT_MS,
    kattis, platforms,
};

/// Main harness configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository root holding one directory per platform
    pub root: PathBuf,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Solution execution limits
    pub execution: ExecutionConfig,
    /// Explicit `.kattisrc` location, if overridden
    pub kattisrc_path: Option<PathBuf>,
}

/// Execution limits configuration
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Wall-clock limit per run in milliseconds
    pub time_limit_ms: u64,
    /// Captured stdout cap in bytes
    pub output_limit_bytes: usize,
    /// Interpreter for `.py` solutions
    pub python: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            python: DEFAULT_PYTHON.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `cwd` is used to discover the repository root when `CPH_ROOT` is not
    /// set.
    pub fn from_env(cwd: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let root = match env::var("CPH_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => discover_root(cwd),
        };

        Ok(Self {
            root,
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
            execution: ExecutionConfig::from_env()?,
            kattisrc_path: env::var("CPH_KATTISRC").ok().map(PathBuf::from),
        })
    }

    /// Directory holding every problem of one platform
    pub fn platform_root(&self, platform: &str) -> PathBuf {
        self.root.join(platform)
    }

    /// Location of the Kattis credentials file
    pub fn kattisrc(&self) -> PathBuf {
        self.kattisrc_path.clone().unwrap_or_else(|| {
            self.platform_root(platforms::KATTIS)
                .join(kattis::KATTISRC_FILE_NAME)
        })
    }
}

impl ExecutionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            time_limit_ms: env::var("CPH_TIME_LIMIT_MS")
                .unwrap_or_else(|_| DEFAULT_TIME_LIMIT_MS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CPH_TIME_LIMIT_MS".to_string()))?,
            output_limit_bytes: env::var("CPH_OUTPUT_LIMIT_BYTES")
                .unwrap_or_else(|_| DEFAULT_OUTPUT_LIMIT_BYTES.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("CPH_OUTPUT_LIMIT_BYTES".to_string()))?,
            python: env::var("CPH_PYTHON").unwrap_or_else(|_| DEFAULT_PYTHON.to_string()),
        })
    }
}

/// Walk up from `cwd` to the first directory containing a platform directory.
///
/// Falls back to `cwd` itself so `cph kattis new <id>` works in an empty
/// checkout.
pub fn discover_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| platforms::ALL.iter().any(|name| dir.join(name).is_dir()))
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Kattis account and endpoint settings read from `.kattisrc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KattisCredentials {
    pub username: String,
    pub token: String,
    pub hostname: String,
    pub login_url: String,
    pub submission_url: String,
}

impl KattisCredentials {
    /// Read credentials from a `.kattisrc` file
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::Missing(path.display().to_string()))?;
        Self::parse(&raw)
    }

    /// Parse the INI-style `.kattisrc` contents
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let ini = parse_ini(raw);
        let get = |section: &str, key: &str| {
            ini.get(&(section.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| ConfigError::Missing(format!("[{}] {}", section, key)))
        };

        let hostname =
            kattisrc_hostname(raw).unwrap_or_else(|| kattis::DEFAULT_HOSTNAME.to_string());

        Ok(Self {
            username: get("user", "username")?,
            token: get("user", "token")?,
            login_url: get("kattis", "loginurl")
                .unwrap_or_else(|_| format!("https://{}/login", hostname)),
            submission_url: get("kattis", "submissionurl")
                .unwrap_or_else(|_| format!("https://{}/submit", hostname)),
            hostname,
        })
    }
}

/// The judge host a `.kattisrc` names, whether or not it holds credentials
pub fn kattisrc_hostname(raw: &str) -> Option<String> {
    parse_ini(raw).remove(&("kattis".to_string(), "hostname".to_string()))
}

/// Flatten `[section] key: value` lines into a (section, key) map.
///
/// Keys are lowercased; both `:` and `=` separate keys from values; lines
/// starting with `#` or `;` are comments.
fn parse_ini(raw: &str) -> HashMap<(String, String), String> {
    let mut values = HashMap::new();
    let mut section = String::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_lowercase();
            continue;
        }
        let Some(split) = line.find([':', '=']) else {
            continue;
        };
        let (key, value) = line.split_at(split);
        values.insert(
            (section.clone(), key.trim().to_lowercase()),
            value[1..].trim().to_string(),
        );
    }

    values
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl From<ConfigError> for crate::error::AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing(what) => crate::error::AppError::ConfigMissing(what),
            ConfigError::InvalidValue(what) => crate::error::AppError::InvalidConfig(what),
        }
    }
}
