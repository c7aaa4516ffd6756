//! Application-wide constants
//!
//! This module contains all constant values used throughout the harness.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// PROBLEM LAYOUT
// =============================================================================

/// Entry file every problem directory holds
pub const SOLUTION_FILE_NAME: &str = "solution.py";

/// Case table every problem directory holds
pub const TESTS_FILE_NAME: &str = "tests.toml";

/// Legacy single-value expected answer (Project Euler only)
pub const LEGACY_ANSWER_FILE_NAME: &str = "answer.txt";

/// Comment marker that disables a legacy answer file
pub const LEGACY_ANSWER_COMMENT: &str = "#";

// =============================================================================
// EXECUTION DEFAULTS
// =============================================================================

/// Default wall-clock limit per solution run in milliseconds
pub const DEFAULT_TIME_LIMIT_MS: u64 = 10_000;

/// Default cap on captured stdout in bytes (64 MB)
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// Maximum stderr kept as runtime error diagnostic (4 KB)
pub const MAX_DIAGNOSTIC_BYTES: usize = 4 * 1024;

/// Default Python interpreter used to launch `.py` solutions
pub const DEFAULT_PYTHON: &str = "python3";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "cph=warn";

// =============================================================================
// REPORTING
// =============================================================================

/// Width of the `=` banner framing each case
pub const BANNER_WIDTH: usize = 50;

/// Maximum characters printed per diagnostic section
pub const MAX_SECTION_CHARS: usize = 2000;

// =============================================================================
// PLATFORMS
// =============================================================================

/// Platform identifiers (also the directory names under the root)
pub mod platforms {
    pub const KATTIS: &str = "kattis";
    pub const EULER: &str = "euler";

    /// All supported platform identifiers
    pub const ALL: &[&str] = &[KATTIS, EULER];
}

/// Kattis judge defaults
pub mod kattis {
    /// Credentials file name inside the kattis directory
    pub const KATTISRC_FILE_NAME: &str = ".kattisrc";

    /// Default judge host, used for sample downloads
    pub const DEFAULT_HOSTNAME: &str = "open.kattis.com";

    /// Problem page, with `{host}` and `{id}` placeholders
    pub const PROBLEM_URL: &str = "https://{host}/problems/{id}";

    /// Language declared on upload
    pub const SUBMIT_LANGUAGE: &str = "Python 3";

    /// Multipart field carrying the solution bytes
    pub const SUBMIT_FILE_FIELD: &str = "sub_file[]";

    /// Pattern the judge uses to report a new submission
    pub const SUBMISSION_ID_PATTERN: &str = r"Submission ID: (\d+)";

    /// Temp subdirectory caching downloaded samples
    pub const SAMPLES_CACHE_DIR: &str = "kattis_samples";

    /// Sample download timeout in seconds
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30;
}

/// Project Euler defaults
pub mod euler {
    pub const HOSTNAME: &str = "projecteuler.net";

    /// Problem page, with `{host}` and `{id}` placeholders
    pub const PROBLEM_URL: &str = "https://{host}/problem={id}";
}

// =============================================================================
// EXIT CODES
// =============================================================================

/// Process exit codes
pub mod exit_codes {
    /// Command succeeded
    pub const SUCCESS: u8 = 0;
    /// Cases failed or the solution crashed
    pub const FAILURE: u8 = 1;
    /// A precondition aborted the command
    pub const FATAL: u8 = 2;
}
