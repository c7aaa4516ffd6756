//! Kattis judge client
//!
//! HTTP access to the online judge: sample archive downloads and
//! authenticated submissions. The [`JudgeClient`] trait is the seam the
//! Kattis platform talks to, so tests can substitute a mock.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::multipart::{Form, Part};

use crate::{
    config::KattisCredentials,
    constants::{SOLUTION_FILE_NAME, kattis},
    error::{AppError, AppResult},
    models::ProblemId,
    utils::truncate_chars,
};

static SUBMISSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(kattis::SUBMISSION_ID_PATTERN).expect("submission id pattern is valid")
});

/// Response bodies quoted in errors are cut to this many characters
const MAX_BODY_CHARS: usize = 500;

/// A solution ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionUpload {
    pub problem: ProblemId,
    pub file_name: String,
    pub source: Vec<u8>,
}

/// What the judge answered to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub submission_id: Option<String>,
    pub body: String,
}

impl SubmissionReceipt {
    pub fn from_body(body: String) -> Self {
        Self {
            submission_id: extract_submission_id(&body),
            body,
        }
    }

    /// Where the submission can be followed, when its id is known
    pub fn tracking_url(&self, hostname: &str) -> Option<String> {
        self.submission_id
            .as_ref()
            .map(|id| format!("https://{}/submissions/{}", hostname, id))
    }
}

/// Pull the numeric id out of the judge's submission response
pub fn extract_submission_id(body: &str) -> Option<String> {
    SUBMISSION_ID
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Remote judge operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Download the zipped sample fixtures of a problem
    async fn fetch_samples(&self, hostname: &str, problem: &ProblemId) -> AppResult<Vec<u8>>;

    /// Log in and upload a solution within one cookie session
    async fn submit(
        &self,
        credentials: &KattisCredentials,
        upload: SolutionUpload,
    ) -> AppResult<SubmissionReceipt>;
}

/// [`JudgeClient`] talking to a Kattis instance over HTTPS
pub struct KattisClient {
    http: reqwest::Client,
}

impl KattisClient {
    pub fn new() -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(kattis::DOWNLOAD_TIMEOUT_SECS))
            .user_agent(concat!("cph/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    async fn login(&self, credentials: &KattisCredentials) -> AppResult<()> {
        tracing::debug!(url = %credentials.login_url, user = %credentials.username, "logging in");

        let response = self
            .http
            .post(&credentials.login_url)
            .form(&[
                ("user", credentials.username.as_str()),
                ("token", credentials.token.as_str()),
                ("script", "true"),
            ])
            .send()
            .await?;

        ensure_success("login", response).await.map(|_| ())
    }
}

#[async_trait]
impl JudgeClient for KattisClient {
    async fn fetch_samples(&self, hostname: &str, problem: &ProblemId) -> AppResult<Vec<u8>> {
        let url = format!(
            "https://{}/problems/{}/file/statement/samples.zip",
            hostname, problem
        );
        tracing::info!(%url, "downloading samples");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::NetworkFailure(format!(
                "sample download from {} failed with status {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn submit(
        &self,
        credentials: &KattisCredentials,
        upload: SolutionUpload,
    ) -> AppResult<SubmissionReceipt> {
        self.login(credentials).await?;

        let file = Part::bytes(upload.source)
            .file_name(upload.file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part(kattis::SUBMIT_FILE_FIELD, file)
            .text("problem", upload.problem.to_string())
            .text("language", kattis::SUBMIT_LANGUAGE)
            .text("mainclass", SOLUTION_FILE_NAME)
            .text("script", "true")
            .text("submit", "true")
            .text("submit_ctr", "2")
            .text("tag", "");

        tracing::info!(problem = %upload.problem, url = %credentials.submission_url, "submitting");

        let response = self
            .http
            .post(&credentials.submission_url)
            .multipart(form)
            .send()
            .await?;

        let body = ensure_success("submission", response).await?;
        Ok(SubmissionReceipt::from_body(body))
    }
}

/// Read the body, turning a non-2xx status into a [`AppError::NetworkFailure`]
async fn ensure_success(action: &str, response: reqwest::Response) -> AppResult<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AppError::NetworkFailure(format!(
            "{} failed with status {}: {}",
            action,
            status,
            truncate_chars(body.trim(), MAX_BODY_CHARS)
        )));
    }

    Ok(body)
}
