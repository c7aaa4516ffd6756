//! Test case model

use serde::{Deserialize, Serialize};

/// One declared (input, optional expected answer) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub stdin: String,
    pub answer: Option<String>,
}

impl TestCase {
    /// Default name for the case at `index` (0-based): `"01"`, `"02"`, ...
    pub fn default_name(index: usize) -> String {
        format!("{:02}", index + 1)
    }

    /// Check whether the case is selected by a `--test-id` filter
    pub fn matches_index(&self, index: u32) -> bool {
        self.name.starts_with(&format!("{:02}", index))
    }
}

/// On-disk shape of `tests.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestTable {
    #[serde(default)]
    pub cases: Vec<CaseRecord>,
}

/// One `[[cases]]` record as written by hand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub stdin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl CaseRecord {
    /// Resolve the record into a case, naming it by position when unnamed
    pub fn into_case(self, index: usize) -> TestCase {
        TestCase {
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| TestCase::default_name(index)),
            stdin: self.stdin,
            answer: self.answer,
        }
    }
}

impl From<&TestCase> for CaseRecord {
    fn from(case: &TestCase) -> Self {
        Self {
            name: Some(case.name.clone()),
            stdin: case.stdin.clone(),
            answer: case.answer.clone(),
        }
    }
}
