//! Project Euler
//!
//! Euler has no submission API: `submit` computes the answer locally and
//! prints it next to the problem URL. Expected answers live in `tests.toml`,
//! with a single-value `answer.txt` still honored when no table exists.

use std::path::Path;

use async_trait::async_trait;

use crate::{
    constants::{LEGACY_ANSWER_COMMENT, euler, platforms},
    error::{AppError, AppResult},
    models::{Problem, ProblemLayout, TestCase},
    runner::{ExecutionResult, InputSource},
    services::{CaseStore, Reporter},
    state::Harness,
    utils::clipboard,
};

use super::{Console, Platform, PlatformConfig, ensure_solution, write_if_absent};

/// Name of the case synthesized from `answer.txt`
const LEGACY_CASE_NAME: &str = "01-answer";

const SOLUTION_TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
Project Euler Problem {id}
{url}
"""


def solve() -> int:
    return 0


if __name__ == "__main__":
    print(solve())
"#;

pub struct EulerPlatform {
    config: PlatformConfig,
    harness: Harness,
}

impl EulerPlatform {
    pub fn new(harness: Harness) -> Self {
        let config = PlatformConfig {
            name: platforms::EULER,
            root: harness.config().platform_root(platforms::EULER),
            layout: ProblemLayout::default(),
            solution_template: SOLUTION_TEMPLATE,
            tests_template: CaseStore::template(),
            default_host: euler::HOSTNAME,
            problem_url: euler::PROBLEM_URL,
            credentials: None,
        };
        Self { config, harness }
    }

    fn problem_url(&self, problem: &Problem) -> String {
        self.config.problem_page(self.config.default_host, &problem.id)
    }

    /// Show or replace the legacy single-value answer
    pub async fn answer(
        &self,
        problem: &Problem,
        set: Option<&str>,
        show: bool,
        console: &mut Console<'_>,
    ) -> AppResult<()> {
        let path = problem.legacy_answer_file();

        if let Some(value) = set {
            let value = value.trim();
            tokio::fs::create_dir_all(&problem.dir).await?;
            tokio::fs::write(&path, format!("{}\n", value)).await?;
            console.say(format!("Saved answer for problem {}: {}", problem.id, value));
            if !show {
                return Ok(());
            }
        }

        match read_legacy_answer(&path).await? {
            Some(value) => console.say(format!("Answer for problem {}: {}", problem.id, value)),
            None => console.say(format!("No answer recorded for problem {}", problem.id)),
        }
        Ok(())
    }
}

/// Read `answer.txt`; empty or commented files carry no value
pub async fn read_legacy_answer(path: &Path) -> AppResult<Option<String>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let value = raw.trim();
    if value.is_empty() || value.starts_with(LEGACY_ANSWER_COMMENT) {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}

#[async_trait]
impl Platform for EulerPlatform {
    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn harness(&self) -> &Harness {
        &self.harness
    }

    async fn scaffold(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<()> {
        let source = self.config.render_solution(problem, self.config.default_host);
        write_if_absent(&problem.solution_file(), &source, console).await?;
        write_if_absent(&problem.tests_file(), self.config.tests_template, console).await?;
        console.say(format!("Problem directory ready: {}", problem.dir.display()));
        Ok(())
    }

    async fn load_cases(
        &self,
        problem: &Problem,
        _console: &mut Console<'_>,
    ) -> AppResult<Vec<TestCase>> {
        let tests_file = problem.tests_file();
        if tokio::fs::try_exists(&tests_file).await? {
            return CaseStore::load_file(&tests_file).await;
        }

        match read_legacy_answer(&problem.legacy_answer_file()).await? {
            Some(answer) => {
                tracing::debug!(problem = %problem.id, "using legacy answer.txt");
                Ok(vec![TestCase {
                    name: LEGACY_CASE_NAME.to_string(),
                    stdin: String::new(),
                    answer: Some(answer),
                }])
            }
            None => Err(AppError::TestTableMissing(tests_file)),
        }
    }

    async fn submit(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<bool> {
        let solution = ensure_solution(problem).await?;
        let result = self
            .harness
            .runner()
            .execute(&solution, &InputSource::Empty, &mut console.echo)
            .await?;

        let ExecutionResult::Completed { stdout, .. } = &result else {
            let case = TestCase {
                name: problem.id.to_string(),
                stdin: String::new(),
                answer: None,
            };
            Reporter::new(&mut *console.out).record(&case, &result);
            return Ok(false);
        };

        console.say("Submit this answer on Project Euler:");
        console.say(format!("Problem: {}", self.problem_url(problem)));
        console.say(format!("Answer:  {}", stdout));
        if clipboard::copy(stdout).await {
            console.say("(Copied answer to clipboard)");
        }
        Ok(true)
    }
}
