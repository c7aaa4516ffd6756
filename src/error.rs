//! Custom error types and handling
//!
//! This module defines the harness's error types and maps each of them to
//! the process exit code the dispatcher reports.

use std::path::PathBuf;

use crate::constants::exit_codes;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Problem resolution errors
    #[error("Invalid problem id: {0:?}")]
    InvalidProblemId(String),

    #[error("Not in a {platform} problem directory. Specify a problem id or cd into {platform}/<id>")]
    NotInProblemDirectory { platform: String },

    #[error("Solution file not found: {}", .0.display())]
    SolutionMissing(PathBuf),

    // Case table errors
    #[error("Test table not found: {}", .0.display())]
    TestTableMissing(PathBuf),

    #[error("Malformed test table: {0}")]
    MalformedTestTable(String),

    #[error("No test table and no downloadable samples for {0}")]
    NoSamplesAvailable(String),

    #[error("No test case name starts with {0:02}")]
    NoMatchingCases(u32),

    // External service errors
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Failed to launch solution: {0}")]
    Launch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigMissing(_) => "CONFIG_MISSING",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidProblemId(_) => "INVALID_PROBLEM_ID",
            Self::NotInProblemDirectory { .. } => "NOT_IN_PROBLEM_DIRECTORY",
            Self::SolutionMissing(_) => "SOLUTION_MISSING",
            Self::TestTableMissing(_) => "TEST_TABLE_MISSING",
            Self::MalformedTestTable(_) => "MALFORMED_TEST_TABLE",
            Self::NoSamplesAvailable(_) => "NO_SAMPLES_AVAILABLE",
            Self::NoMatchingCases(_) => "NO_MATCHING_CASES",
            Self::NetworkFailure(_) => "NETWORK_FAILURE",
            Self::Launch(_) => "LAUNCH_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the process exit code for this error
    ///
    /// Every error that reaches the dispatcher aborted a command before it
    /// could produce a verdict, so they all share the fatal code.
    pub fn exit_code(&self) -> u8 {
        exit_codes::FATAL
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkFailure(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::MalformedTestTable(err.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Internal(anyhow::anyhow!("invalid samples archive: {}", err))
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
