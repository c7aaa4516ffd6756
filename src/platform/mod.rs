//! Puzzle platforms
//!
//! A [`Platform`] owns one directory of problems under the repository root.
//! Resolving ids, running a solution and testing it against its case table
//! are shared; scaffolding, where cases come from and how a solution is
//! submitted differ per platform.

pub mod euler;
pub mod kattis;

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::{
    error::{AppError, AppResult},
    models::{Problem, ProblemId, ProblemLayout, TestCase, TestReport},
    runner::{ExecutionResult, InputSource},
    services::{CaseStore, Reporter},
    state::Harness,
};

pub use euler::EulerPlatform;
pub use kattis::KattisPlatform;

/// Where a command writes what the user sees
pub struct Console<'a> {
    /// Verdicts, diagnostics and command messages
    pub out: &'a mut (dyn Write + Send),
    /// Live copy of the solution's stdout
    pub echo: &'a mut (dyn AsyncWrite + Unpin + Send),
}

impl Console<'_> {
    /// Print one message line; the report stream never aborts a command
    pub fn say(&mut self, message: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{}", message);
    }
}

/// Per-platform layout, templates and submission reference
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Platform name, also its directory under the root
    pub name: &'static str,
    /// Directory holding all problems of this platform
    pub root: PathBuf,
    pub layout: ProblemLayout,
    /// Solution scaffold with `{id}` and `{url}` placeholders
    pub solution_template: &'static str,
    /// Case table written when nothing better is known
    pub tests_template: &'static str,
    /// Host used when no credentials name one
    pub default_host: &'static str,
    /// Problem page with `{host}` and `{id}` placeholders
    pub problem_url: &'static str,
    /// Credentials file for judges that take uploads; `None` means answers
    /// are entered by hand on the problem page
    pub credentials: Option<PathBuf>,
}

impl PlatformConfig {
    pub fn problem_page(&self, host: &str, id: &ProblemId) -> String {
        self.problem_url
            .replace("{host}", host)
            .replace("{id}", id.as_str())
    }

    /// Solution source for a freshly scaffolded problem
    pub fn render_solution(&self, problem: &Problem, host: &str) -> String {
        self.solution_template
            .replace("{url}", &self.problem_page(host, &problem.id))
            .replace("{id}", problem.id.as_str())
    }
}

/// A puzzle ecosystem with its own problem directory
#[async_trait]
pub trait Platform: Send + Sync {
    fn config(&self) -> &PlatformConfig;

    fn harness(&self) -> &Harness;

    fn name(&self) -> &'static str {
        self.config().name
    }

    fn root(&self) -> &Path {
        &self.config().root
    }

    fn problem(&self, id: ProblemId) -> Problem {
        Problem::new(self.root(), id, self.config().layout)
    }

    /// Use the explicit id, or infer it from the working directory
    fn resolve_id(&self, explicit: Option<&str>) -> AppResult<Problem> {
        let id = match explicit {
            Some(raw) => ProblemId::parse(raw)?,
            None => detect_problem_id(self.harness().cwd(), self.root(), self.name())
                .ok_or_else(|| AppError::NotInProblemDirectory {
                    platform: self.name().to_string(),
                })?,
        };

        Ok(self.problem(id))
    }

    /// Create the problem directory with its solution and case resources.
    ///
    /// Existing files are never overwritten.
    async fn scaffold(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<()>;

    /// The ordered cases `test` runs
    async fn load_cases(&self, problem: &Problem, console: &mut Console<'_>)
    -> AppResult<Vec<TestCase>>;

    /// Hand the solution to the platform. Returns whether it was accepted for
    /// submission.
    async fn submit(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<bool>;

    /// Run the solution once against `input`.
    ///
    /// Returns `false` when it crashed or timed out. Output past the capture
    /// limit has still been echoed in full, so it does not count against a
    /// run.
    async fn run(
        &self,
        problem: &Problem,
        input: InputSource,
        console: &mut Console<'_>,
    ) -> AppResult<bool> {
        let solution = ensure_solution(problem).await?;
        let result = self
            .harness()
            .runner()
            .execute(&solution, &input, &mut console.echo)
            .await?;

        if let ExecutionResult::Completed { elapsed, .. }
        | ExecutionResult::OutputLimitExceeded { elapsed, .. } = result
        {
            tracing::info!(problem = %problem.id, elapsed_ms = elapsed.as_millis() as u64, "run finished");
            return Ok(true);
        }

        let stdin = match &input {
            InputSource::Empty => String::new(),
            InputSource::Text(text) => text.clone(),
            InputSource::File(path) => format!("(contents of {})", path.display()),
        };
        let case = TestCase {
            name: problem.id.to_string(),
            stdin,
            answer: None,
        };
        Reporter::new(&mut *console.out).record(&case, &result);
        Ok(false)
    }

    /// Run every selected case in order and report each verdict
    async fn test(
        &self,
        problem: &Problem,
        filter: Option<u32>,
        console: &mut Console<'_>,
    ) -> AppResult<TestReport> {
        let solution = ensure_solution(problem).await?;
        let cases = CaseStore::select(self.load_cases(problem, console).await?, filter)?;
        let runner = self.harness().runner();

        tracing::info!(problem = %problem.id, cases = cases.len(), "testing");

        let mut reporter = Reporter::new(&mut *console.out);
        let mut results = Vec::with_capacity(cases.len());
        for case in &cases {
            reporter.begin(case);
            let input = InputSource::Text(case.stdin.clone());
            let result = runner.execute(&solution, &input, &mut console.echo).await?;
            results.push(reporter.record(case, &result));
        }
        reporter.summarize(&results);

        Ok(TestReport::new(problem.id.as_str(), results))
    }
}

/// Infer the problem id from a working directory inside `<root>/<name>/<id>`.
///
/// A parent directory merely named after the platform also counts, so a
/// problem checkout outside the configured root still resolves.
pub fn detect_problem_id(cwd: &Path, platform_root: &Path, name: &str) -> Option<ProblemId> {
    let parent = cwd.parent()?;
    let inside_root = parent == platform_root
        || matches!(
            (parent.canonicalize(), platform_root.canonicalize()),
            (Ok(a), Ok(b)) if a == b
        );
    let named_after = parent.file_name().is_some_and(|n| n == name);

    if !(inside_root || named_after) {
        return None;
    }

    ProblemId::parse(cwd.file_name()?.to_str()?).ok()
}

/// Path of the solution entry file, which must exist
pub async fn ensure_solution(problem: &Problem) -> AppResult<PathBuf> {
    let solution = problem.solution_file();
    if tokio::fs::try_exists(&solution).await? {
        Ok(solution)
    } else {
        Err(AppError::SolutionMissing(solution))
    }
}

/// Write `contents` to `path` unless the file already exists.
///
/// Returns whether the file was created.
pub async fn write_if_absent(
    path: &Path,
    contents: &str,
    console: &mut Console<'_>,
) -> AppResult<bool> {
    if tokio::fs::try_exists(path).await? {
        console.say(format!("Exists:  {}", path.display()));
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    console.say(format!("Created: {}", path.display()));
    Ok(true)
}


#[cfg(test)]
mod tests {
    use super::test_support::{Captured, harness, harness_with};
    use super::*;
    use crate::config::ExecutionConfig;
    use crate::models::{FailureKind, Verdict};

    /// Euler problem `1` holding `solution` and `tests`
    fn euler_problem(
        root: &Path,
        execution: ExecutionConfig,
        solution: &str,
        tests: &str,
    ) -> (EulerPlatform, Problem) {
        let problem_dir = root.join("euler").join("1");
        std::fs::create_dir_all(&problem_dir).unwrap();
        std::fs::write(problem_dir.join("solution.py"), solution).unwrap();
        std::fs::write(problem_dir.join("tests.toml"), tests).unwrap();

        let platform = EulerPlatform::new(harness_with(root, root, execution));
        let problem = platform.resolve_id(Some("1")).unwrap();
        (platform, problem)
    }

    #[test]
    fn test_platform_config_renders_templates() {
        let config = PlatformConfig {
            name: "euler",
            root: PathBuf::from("/repo/euler"),
            layout: ProblemLayout {
                solution_file_name: "main.py",
                ..ProblemLayout::default()
            },
            solution_template: "# {id} at {url}\n",
            tests_template: "",
            default_host: "projecteuler.net",
            problem_url: "https://{host}/problem={id}",
            credentials: None,
        };
        let problem = Problem::new(&config.root, ProblemId::parse("12").unwrap(), config.layout);

        assert_eq!(
            config.render_solution(&problem, config.default_host),
            "# 12 at https://projecteuler.net/problem=12\n"
        );
        assert_eq!(problem.solution_file(), PathBuf::from("/repo/euler/12/main.py"));
    }

    #[tokio::test]
    async fn test_truncated_output_fails_even_when_prefix_matches() {
        let dir = tempfile::tempdir().unwrap();
        let execution = ExecutionConfig {
            output_limit_bytes: 4,
            python: "sh".to_string(),
            ..ExecutionConfig::default()
        };
        let (platform, problem) = euler_problem(
            dir.path(),
            execution,
            "echo 0123456789\n",
            "[[cases]]\nanswer = \"0123\"\n",
        );

        let mut captured = Captured::default();
        let report = platform
            .test(&problem, None, &mut captured.console())
            .await
            .unwrap();

        assert_eq!(report.cases[0].verdict, Verdict::Fail);
        assert_eq!(report.cases[0].failure, Some(FailureKind::OutputLimitExceeded));
        assert!(!report.summary.success());
    }

    #[tokio::test]
    async fn test_timeout_does_not_stop_later_cases() {
        let dir = tempfile::tempdir().unwrap();
        let execution = ExecutionConfig {
            time_limit_ms: 300,
            python: "sh".to_string(),
            ..ExecutionConfig::default()
        };
        let (platform, problem) = euler_problem(
            dir.path(),
            execution,
            "read n\nif [ \"$n\" = slow ]; then sleep 5; fi\necho $((n * n))\n",
            "[[cases]]\nstdin = \"slow\\n\"\nanswer = \"0\"\n\
             [[cases]]\nstdin = \"3\\n\"\nanswer = \"9\"\n",
        );

        let mut captured = Captured::default();
        let report = platform
            .test(&problem, None, &mut captured.console())
            .await
            .unwrap();

        let outcomes: Vec<(Verdict, Option<FailureKind>)> =
            report.cases.iter().map(|c| (c.verdict, c.failure)).collect();
        assert_eq!(
            outcomes,
            [
                (Verdict::Fail, Some(FailureKind::TimeLimitExceeded)),
                (Verdict::Pass, None)
            ]
        );
        assert_eq!(report.summary.total(), 2);
    }

    #[test]
    fn test_detect_problem_id() {
        let root = Path::new("/repo/kattis");

        let id = detect_problem_id(Path::new("/repo/kattis/hello"), root, "kattis").unwrap();
        assert_eq!(id.as_str(), "hello");

        let elsewhere =
            detect_problem_id(Path::new("/elsewhere/kattis/knapsack"), root, "kattis").unwrap();
        assert_eq!(elsewhere.as_str(), "knapsack");

        assert!(detect_problem_id(Path::new("/repo/kattis"), root, "kattis").is_none());
        assert!(detect_problem_id(Path::new("/repo/euler/1"), root, "kattis").is_none());
    }

    #[tokio::test]
    async fn test_write_if_absent_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p").join("solution.py");
        let mut captured = Captured::default();

        assert!(write_if_absent(&path, "first", &mut captured.console()).await.unwrap());
        assert!(!write_if_absent(&path, "second", &mut captured.console()).await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_run_and_test_share_the_runner() {
        let dir = tempfile::tempdir().unwrap();
        let problem_dir = dir.path().join("euler").join("1");
        std::fs::create_dir_all(&problem_dir).unwrap();
        // The test harness launches `.py` entries with `sh`
        std::fs::write(
            problem_dir.join("solution.py"),
            "read n\nif [ \"$n\" = 0 ]; then exit 3; fi\necho $((n * n))\n",
        )
        .unwrap();
        std::fs::write(
            problem_dir.join("tests.toml"),
            "[[cases]]\nname = \"01-square\"\nstdin = \"3\\n\"\nanswer = \"9\"\n\
             [[cases]]\nname = \"02-wrong\"\nstdin = \"4\\n\"\nanswer = \"15\"\n\
             [[cases]]\nname = \"03-crash\"\nstdin = \"0\\n\"\n\
             [[cases]]\nname = \"04-open\"\nstdin = \"5\\n\"\n",
        )
        .unwrap();

        let platform = EulerPlatform::new(harness(dir.path(), &problem_dir));
        let problem = platform.resolve_id(None).unwrap();
        assert_eq!(problem.id.as_str(), "1");

        let mut captured = Captured::default();
        let report = platform
            .test(&problem, None, &mut captured.console())
            .await
            .unwrap();

        let verdicts: Vec<Verdict> = report.cases.iter().map(|c| c.verdict).collect();
        assert_eq!(
            verdicts,
            [Verdict::Pass, Verdict::Fail, Verdict::Fail, Verdict::Unchecked]
        );
        assert_eq!(report.summary.failed, 2);
        assert!(captured.printed().contains("Results: 1 passed, 2 failed, 1 unchecked"));

        let mut captured = Captured::default();
        let filtered = platform
            .test(&problem, Some(1), &mut captured.console())
            .await
            .unwrap();
        assert!(filtered.summary.success());

        let mut captured = Captured::default();
        let ok = platform
            .run(&problem, InputSource::Text("7\n".to_string()), &mut captured.console())
            .await
            .unwrap();
        assert!(ok);
        assert_eq!(captured.echo, b"49\n");

        let mut captured = Captured::default();
        let crashed = platform
            .run(&problem, InputSource::Text("0\n".to_string()), &mut captured.console())
            .await
            .unwrap();
        assert!(!crashed);
        assert!(captured.printed().contains("[RE]"));
    }

    #[tokio::test]
    async fn test_missing_solution() {
        let dir = tempfile::tempdir().unwrap();
        let platform = EulerPlatform::new(harness(dir.path(), dir.path()));
        let problem = platform.resolve_id(Some("7")).unwrap();

        let mut captured = Captured::default();
        let err = platform
            .test(&problem, None, &mut captured.console())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SolutionMissing(_)));

        assert!(matches!(
            platform.resolve_id(None),
            Err(AppError::NotInProblemDirectory { .. })
        ));
    }
}
