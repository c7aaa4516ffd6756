//! Kattis
//!
//! Cases come from `tests.toml`, generated from the problem's downloadable
//! samples the first time they are needed. Submissions go to the judge
//! configured in `.kattisrc`.

use async_trait::async_trait;

use crate::{
    config::{KattisCredentials, kattisrc_hostname},
    constants::{kattis, platforms},
    error::{AppError, AppResult},
    models::{Problem, ProblemLayout, TestCase},
    services::{CaseStore, JudgeClient, SampleCache, SolutionUpload},
    state::Harness,
};

use super::{Console, Platform, PlatformConfig, ensure_solution, write_if_absent};

const SOLUTION_TEMPLATE: &str = r#"#!/usr/bin/env python3
"""
Problem: {id}
URL: {url}
"""

import sys


def solve(data: str) -> str:
    return ""


if __name__ == "__main__":
    print(solve(sys.stdin.read()))
"#;

pub struct KattisPlatform {
    config: PlatformConfig,
    harness: Harness,
    client: Box<dyn JudgeClient>,
    samples: SampleCache,
}

impl KattisPlatform {
    pub fn new(harness: Harness, client: Box<dyn JudgeClient>) -> Self {
        let config = PlatformConfig {
            name: platforms::KATTIS,
            root: harness.config().platform_root(platforms::KATTIS),
            layout: ProblemLayout::default(),
            solution_template: SOLUTION_TEMPLATE,
            tests_template: CaseStore::template(),
            default_host: kattis::DEFAULT_HOSTNAME,
            problem_url: kattis::PROBLEM_URL,
            credentials: Some(harness.config().kattisrc()),
        };
        Self {
            config,
            harness,
            client,
            samples: SampleCache::default(),
        }
    }

    /// Use a different sample cache directory
    pub fn with_sample_cache(mut self, samples: SampleCache) -> Self {
        self.samples = samples;
        self
    }

    async fn credentials(&self) -> AppResult<KattisCredentials> {
        let path = self
            .config
            .credentials
            .as_deref()
            .ok_or_else(|| AppError::ConfigMissing(kattis::KATTISRC_FILE_NAME.to_string()))?;
        Ok(KattisCredentials::load(path).await?)
    }

    /// Judge host for public pages; a `.kattisrc` without credentials may
    /// still name one
    async fn hostname(&self) -> String {
        let default = self.config.default_host;
        let Some(path) = self.config.credentials.as_deref() else {
            return default.to_string();
        };

        match tokio::fs::read_to_string(path).await {
            Ok(raw) => kattisrc_hostname(&raw).unwrap_or_else(|| default.to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "using default judge host");
                default.to_string()
            }
        }
    }

    /// Cases built from the problem's samples, if the judge has any
    async fn sample_cases(&self, problem: &Problem) -> AppResult<Option<Vec<TestCase>>> {
        let hostname = self.hostname().await;
        let Some(dir) = self
            .samples
            .ensure(self.client.as_ref(), &hostname, &problem.id)
            .await?
        else {
            return Ok(None);
        };

        let cases = CaseStore::from_samples(&dir).await?;
        Ok((!cases.is_empty()).then_some(cases))
    }

    async fn write_tests_from_samples(
        &self,
        problem: &Problem,
        cases: &[TestCase],
        console: &mut Console<'_>,
    ) -> AppResult<()> {
        let rendered = CaseStore::render(cases)?;
        write_if_absent(&problem.tests_file(), &rendered, console).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for KattisPlatform {
    fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn harness(&self) -> &Harness {
        &self.harness
    }

    async fn scaffold(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<()> {
        let hostname = self.hostname().await;
        let source = self.config.render_solution(problem, &hostname);
        write_if_absent(&problem.solution_file(), &source, console).await?;

        let tests_file = problem.tests_file();
        if !tokio::fs::try_exists(&tests_file).await? {
            match self.sample_cases(problem).await {
                Ok(Some(cases)) => {
                    self.write_tests_from_samples(problem, &cases, console).await?;
                }
                Ok(None) => {
                    write_if_absent(&tests_file, self.config.tests_template, console).await?;
                }
                Err(e) => {
                    tracing::warn!(problem = %problem.id, error = %e, "could not use samples");
                    write_if_absent(&tests_file, self.config.tests_template, console).await?;
                }
            }
        }

        console.say(format!("Problem directory ready: {}", problem.dir.display()));
        Ok(())
    }

    async fn load_cases(
        &self,
        problem: &Problem,
        console: &mut Console<'_>,
    ) -> AppResult<Vec<TestCase>> {
        let tests_file = problem.tests_file();
        if tokio::fs::try_exists(&tests_file).await? {
            return CaseStore::load_file(&tests_file).await;
        }

        let cases = self
            .sample_cases(problem)
            .await?
            .ok_or_else(|| AppError::NoSamplesAvailable(problem.id.to_string()))?;
        self.write_tests_from_samples(problem, &cases, console).await?;
        Ok(cases)
    }

    async fn submit(&self, problem: &Problem, console: &mut Console<'_>) -> AppResult<bool> {
        let solution = ensure_solution(problem).await?;
        let credentials = self.credentials().await?;
        let source = tokio::fs::read(&solution).await?;

        console.say(format!("Submitting {} to Kattis...", problem.id));
        let receipt = self
            .client
            .submit(
                &credentials,
                SolutionUpload {
                    problem: problem.id.clone(),
                    file_name: self.config.layout.solution_file_name.to_string(),
                    source,
                },
            )
            .await?;

        match receipt.tracking_url(&credentials.hostname) {
            Some(url) => {
                let id = receipt.submission_id.as_deref().unwrap_or_default();
                console.say(format!("Submitted! ID: {}", id));
                console.say(format!("Track: {}", url));
            }
            None => {
                console.say("Submitted! (submission id unknown)");
                console.say(receipt.body.trim());
            }
        }
        Ok(true)
    }
}
