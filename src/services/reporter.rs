//! Reporter
//!
//! Turns execution results into verdicts and prints them for a human
//! scanning a long test run.

use std::io::Write;

use crate::{
    constants::{BANNER_WIDTH, MAX_SECTION_CHARS},
    models::{CaseResult, FailureKind, RunSummary, TestCase, Verdict},
    runner::ExecutionResult,
    utils::{format_elapsed, strip_trailing_newlines, truncate_chars},
};

/// Compare an output against the case's recorded answer.
///
/// Both sides are normalized only by stripping trailing newlines.
pub fn classify(case: &TestCase, actual: &str) -> Verdict {
    match &case.answer {
        None => Verdict::Unchecked,
        Some(expected) if strip_trailing_newlines(expected) == strip_trailing_newlines(actual) => {
            Verdict::Pass
        }
        Some(_) => Verdict::Fail,
    }
}

/// Prints per-case verdicts and the final tally to an explicit writer
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    /// Frame the start of a case
    pub fn begin(&mut self, case: &TestCase) {
        self.banner(&format!("Test: {}", case.name));
    }

    /// Classify one execution and print its verdict and diagnostics
    pub fn record(&mut self, case: &TestCase, result: &ExecutionResult) -> CaseResult {
        let elapsed = result.elapsed();

        match result {
            ExecutionResult::Completed { stdout, .. } => match classify(case, stdout) {
                Verdict::Pass => {
                    let passed = CaseResult::pass(&case.name, elapsed);
                    self.verdict_line(&passed);
                    passed
                }
                Verdict::Unchecked => {
                    let unchecked = CaseResult::unchecked(&case.name, elapsed);
                    self.verdict_line(&unchecked);
                    self.line("No expected answer recorded");
                    self.section("Output", stdout);
                    unchecked
                }
                Verdict::Fail => {
                    let failed = CaseResult::fail(&case.name, FailureKind::WrongAnswer, elapsed);
                    self.verdict_line(&failed);
                    self.section("Input", &case.stdin);
                    self.section("Expected", case.answer.as_deref().unwrap_or_default());
                    self.section("Actual", stdout);
                    failed
                }
            },
            ExecutionResult::RuntimeError {
                exit_code,
                message,
                stdout,
                ..
            } => {
                let failed = CaseResult::fail(&case.name, FailureKind::RuntimeError, elapsed);
                self.verdict_line(&failed);
                if let Some(code) = exit_code {
                    self.line(&format!("Exit code: {}", code));
                }
                self.section("Input", &case.stdin);
                self.section("Error", message);
                if !stdout.is_empty() {
                    self.section("Output before failure", stdout);
                }
                failed
            }
            ExecutionResult::TimeLimitExceeded { limit_ms } => {
                let failed = CaseResult::fail(&case.name, FailureKind::TimeLimitExceeded, elapsed);
                self.verdict_line(&failed);
                self.line(&format!("Solution killed after {}ms", limit_ms));
                self.section("Input", &case.stdin);
                failed
            }
            ExecutionResult::OutputLimitExceeded {
                limit_bytes,
                stdout,
                ..
            } => {
                let failed =
                    CaseResult::fail(&case.name, FailureKind::OutputLimitExceeded, elapsed);
                self.verdict_line(&failed);
                self.line(&format!("Output exceeded {} bytes and was not compared", limit_bytes));
                self.section("Input", &case.stdin);
                self.section("Output (truncated)", stdout);
                failed
            }
        }
    }

    /// Tally the run and print the result line
    pub fn summarize(&mut self, results: &[CaseResult]) -> RunSummary {
        let summary = RunSummary::from_results(results);
        let _ = writeln!(self.out);
        self.banner(&format!(
            "Results: {} passed, {} failed, {} unchecked",
            summary.passed, summary.failed, summary.unchecked
        ));
        let _ = self.out.flush();
        summary
    }

    fn verdict_line(&mut self, result: &CaseResult) {
        let code = result
            .failure
            .map(|f| format!(" [{}]", f.code()))
            .unwrap_or_default();
        self.line(&format!(
            "{}{} ({})",
            result.verdict.label(),
            code,
            format_elapsed(result.elapsed)
        ));
    }

    fn banner(&mut self, title: &str) {
        let rule = "=".repeat(BANNER_WIDTH);
        self.line(&rule);
        self.line(title);
        self.line(&rule);
    }

    fn section(&mut self, label: &str, body: &str) {
        let body = truncate_chars(strip_trailing_newlines(body), MAX_SECTION_CHARS);
        let _ = writeln!(self.out, "\n{}:\n{}", label, body);
    }

    // Write failures on the report stream are not worth aborting a run for.
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }
}
