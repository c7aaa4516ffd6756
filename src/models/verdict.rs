//! Verdict types and aggregation

use std::time::Duration;

use serde::Serialize;

/// Verdict for a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Output matched the recorded answer
    Pass,
    /// Wrong answer, crash, timeout or runaway output
    Fail,
    /// No answer recorded; output shown for manual inspection
    Unchecked,
}

impl Verdict {
    /// Get the line printed for this verdict
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "✅ PASSED",
            Verdict::Fail => "❌ FAILED",
            Verdict::Unchecked => "⚠️  UNCHECKED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Unchecked => write!(f, "unchecked"),
        }
    }
}

/// Why a case failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    WrongAnswer,
    RuntimeError,
    TimeLimitExceeded,
    OutputLimitExceeded,
}

impl FailureKind {
    /// Get short code for the failure
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::WrongAnswer => "WA",
            FailureKind::RuntimeError => "RE",
            FailureKind::TimeLimitExceeded => "TLE",
            FailureKind::OutputLimitExceeded => "OLE",
        }
    }
}

/// Result of judging a single test case
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl CaseResult {
    pub fn pass(name: &str, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            verdict: Verdict::Pass,
            failure: None,
            elapsed,
        }
    }

    pub fn unchecked(name: &str, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            verdict: Verdict::Unchecked,
            failure: None,
            elapsed,
        }
    }

    pub fn fail(name: &str, failure: FailureKind, elapsed: Duration) -> Self {
        Self {
            name: name.to_string(),
            verdict: Verdict::Fail,
            failure: Some(failure),
            elapsed,
        }
    }
}

fn serialize_millis<S: serde::Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(elapsed.as_millis() as u64)
}

/// Aggregated result for a whole `test` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub unchecked: usize,
}

impl RunSummary {
    /// Tally verdicts
    pub fn from_results(results: &[CaseResult]) -> Self {
        let count = |v: Verdict| results.iter().filter(|r| r.verdict == v).count();
        Self {
            passed: count(Verdict::Pass),
            failed: count(Verdict::Fail),
            unchecked: count(Verdict::Unchecked),
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.unchecked
    }

    /// Unchecked cases never gate success
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Everything a `test` run produced, as emitted by `--json`
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub problem: String,
    #[serde(flatten)]
    pub summary: RunSummary,
    pub cases: Vec<CaseResult>,
}

impl TestReport {
    pub fn new(problem: &str, cases: Vec<CaseResult>) -> Self {
        Self {
            problem: problem.to_string(),
            summary: RunSummary::from_results(&cases),
            cases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let ms = Duration::from_millis(3);
        let results = vec![
            CaseResult::pass("01", ms),
            CaseResult::fail("02", FailureKind::WrongAnswer, ms),
            CaseResult::unchecked("03", ms),
            CaseResult::unchecked("04", ms),
        ];
        let summary = RunSummary::from_results(&results);
        assert_eq!(
            summary,
            RunSummary {
                passed: 1,
                failed: 1,
                unchecked: 2
            }
        );
        assert_eq!(summary.total(), results.len());
        assert!(!summary.success());
    }

    #[test]
    fn test_unchecked_does_not_gate_success() {
        let results = vec![CaseResult::unchecked("01", Duration::ZERO)];
        assert!(RunSummary::from_results(&results).success());
    }

    #[test]
    fn test_case_result_json() {
        let result = CaseResult::fail("01-basic", FailureKind::TimeLimitExceeded, Duration::from_millis(1500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["failure"], "TIME_LIMIT_EXCEEDED");
        assert_eq!(json["elapsed"], 1500);
    }

    #[test]
    fn test_report_json_flattens_summary() {
        let report = TestReport::new(
            "hello",
            vec![CaseResult::pass("01", Duration::from_millis(4))],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["problem"], "hello");
        assert_eq!(json["passed"], 1);
        assert_eq!(json["failed"], 0);
        assert_eq!(json["cases"][0]["name"], "01");
    }
}
