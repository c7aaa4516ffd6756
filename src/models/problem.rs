//! Problem model

use std::path::{Path, PathBuf};

use crate::constants::{LEGACY_ANSWER_FILE_NAME, SOLUTION_FILE_NAME, TESTS_FILE_NAME};
use crate::error::{AppError, AppResult};

/// Validated problem identifier (a single directory name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProblemId(String);

impl ProblemId {
    /// Validate and wrap a raw identifier
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && !trimmed.contains(['/', '\\']);

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AppError::InvalidProblemId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProblemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File names inside every problem directory of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemLayout {
    pub solution_file_name: &'static str,
    pub tests_file_name: &'static str,
    pub answer_file_name: &'static str,
}

impl Default for ProblemLayout {
    fn default() -> Self {
        Self {
            solution_file_name: SOLUTION_FILE_NAME,
            tests_file_name: TESTS_FILE_NAME,
            answer_file_name: LEGACY_ANSWER_FILE_NAME,
        }
    }
}

/// A problem directory under a platform root
///
/// The directory is a pure function of the platform root and the id, so two
/// distinct ids never share a directory.
#[derive(Debug, Clone)]
pub struct Problem {
    pub id: ProblemId,
    pub dir: PathBuf,
    layout: ProblemLayout,
}

impl Problem {
    pub fn new(platform_root: &Path, id: ProblemId, layout: ProblemLayout) -> Self {
        let dir = platform_root.join(id.as_str());
        Self { id, dir, layout }
    }

    pub fn solution_file(&self) -> PathBuf {
        self.dir.join(self.layout.solution_file_name)
    }

    pub fn tests_file(&self) -> PathBuf {
        self.dir.join(self.layout.tests_file_name)
    }

    pub fn legacy_answer_file(&self) -> PathBuf {
        self.dir.join(self.layout.answer_file_name)
    }
}
