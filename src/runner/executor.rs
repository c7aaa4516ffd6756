//! Solution executor
//!
//! Every call runs the solution in a fresh child process, feeding it the
//! case input over a pipe and teeing its stdout to an explicit echo sink
//! while capturing it. The harness's own stdin/stdout are never redirected,
//! and the child is killed on drop, so nothing outlives a call no matter how
//! it returns.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::config::ExecutionConfig;
use crate::constants::MAX_DIAGNOSTIC_BYTES;
use crate::error::{AppError, AppResult};
use crate::utils::strip_trailing_newlines;
use crate::utils::text::lossy_prefix;

use super::languages::Language;

/// Where a run reads its standard input from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputSource {
    /// Stdin is closed immediately
    #[default]
    Empty,
    /// Inline text, e.g. a case's `stdin`
    Text(String),
    /// Contents of a file, e.g. `run --file`
    File(PathBuf),
}

impl InputSource {
    async fn read(&self) -> AppResult<Vec<u8>> {
        match self {
            InputSource::Empty => Ok(Vec::new()),
            InputSource::Text(text) => Ok(text.as_bytes().to_vec()),
            InputSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
                AppError::Launch(format!("cannot read input {}: {}", path.display(), e))
            }),
        }
    }
}

/// Result of executing a solution once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Exited successfully; stdout has trailing newlines stripped
    Completed { stdout: String, elapsed: Duration },
    /// Non-zero exit or killed by a signal
    RuntimeError {
        exit_code: Option<i32>,
        message: String,
        stdout: String,
        elapsed: Duration,
    },
    /// Wall-clock limit hit; the child was killed
    TimeLimitExceeded { limit_ms: u64 },
    /// Exited successfully but printed more than the capture limit; `stdout`
    /// holds only the captured prefix
    OutputLimitExceeded {
        limit_bytes: usize,
        stdout: String,
        elapsed: Duration,
    },
}

impl ExecutionResult {
    pub fn elapsed(&self) -> Duration {
        match self {
            ExecutionResult::Completed { elapsed, .. }
            | ExecutionResult::RuntimeError { elapsed, .. }
            | ExecutionResult::OutputLimitExceeded { elapsed, .. } => *elapsed,
            ExecutionResult::TimeLimitExceeded { limit_ms } => Duration::from_millis(*limit_ms),
        }
    }
}

/// Runs one solution against one input source
#[derive(Debug, Clone)]
pub struct Runner {
    execution: ExecutionConfig,
}

impl Runner {
    /// Create a new runner
    pub fn new(execution: ExecutionConfig) -> Self {
        Self { execution }
    }

    /// Execute `solution` with `input` as stdin, teeing stdout into `echo`.
    ///
    /// Errors are reserved for the harness side (unreadable input, missing
    /// interpreter); anything the solution itself does is reported through
    /// [`ExecutionResult`].
    pub async fn execute<W>(
        &self,
        solution: &Path,
        input: &InputSource,
        echo: &mut W,
    ) -> AppResult<ExecutionResult>
    where
        W: AsyncWrite + Unpin,
    {
        let input = input.read().await?;
        let entry = tokio::fs::canonicalize(solution)
            .await
            .map_err(|_| AppError::SolutionMissing(solution.to_path_buf()))?;
        let language = Language::for_path(&entry, &self.execution.python);

        let mut command = language.command(&entry);
        if let Some(dir) = entry.parent() {
            command.current_dir(dir);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            AppError::Launch(format!(
                "{} ({}): {}",
                language.program(&entry).to_string_lossy(),
                language.name(),
                e
            ))
        })?;

        tracing::debug!(
            solution = %entry.display(),
            language = language.name(),
            input_bytes = input.len(),
            "Spawned solution"
        );

        let start = Instant::now();
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let output_limit = self.execution.output_limit_bytes;

        let run = async {
            let (_, stdout, stderr) = tokio::try_join!(
                feed(stdin, &input),
                tee(stdout, echo, output_limit),
                collect(stderr),
            )?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        };

        let limit = Duration::from_millis(self.execution.time_limit_ms);
        let outcome = timeout(limit, run).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok((status, capture, stderr))) => {
                let stdout = String::from_utf8_lossy(&capture.bytes);
                let stdout = strip_trailing_newlines(&stdout).to_string();

                if status.success() {
                    if !stderr.is_empty() {
                        tracing::debug!(
                            stderr = %lossy_prefix(&stderr, MAX_DIAGNOSTIC_BYTES),
                            "Solution wrote to stderr"
                        );
                    }
                    if capture.truncated {
                        Ok(ExecutionResult::OutputLimitExceeded {
                            limit_bytes: output_limit,
                            stdout,
                            elapsed,
                        })
                    } else {
                        Ok(ExecutionResult::Completed { stdout, elapsed })
                    }
                } else {
                    Ok(ExecutionResult::RuntimeError {
                        exit_code: status.code(),
                        message: diagnostic(status, &stderr),
                        stdout,
                        elapsed,
                    })
                }
            }
            Ok(Err(e)) => Err(anyhow::anyhow!("I/O with solution process failed: {}", e).into()),
            Err(_) => {
                tracing::warn!(
                    solution = %entry.display(),
                    limit_ms = self.execution.time_limit_ms,
                    "Time limit exceeded, killing solution"
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill solution: {}", e);
                }
                Ok(ExecutionResult::TimeLimitExceeded {
                    limit_ms: self.execution.time_limit_ms,
                })
            }
        }
    }
}

/// Write the whole input then close the pipe.
///
/// A solution may exit without reading all of its input, which is not an
/// error on our side.
async fn feed<W: AsyncWrite + Unpin>(stdin: Option<W>, input: &[u8]) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input).await {
        Ok(()) => stdin.shutdown().await.or_else(ignore_broken_pipe),
        Err(e) => ignore_broken_pipe(e),
    }
}

fn ignore_broken_pipe(e: std::io::Error) -> std::io::Result<()> {
    if e.kind() == std::io::ErrorKind::BrokenPipe {
        Ok(())
    } else {
        Err(e)
    }
}

/// Captured stdout prefix
#[derive(Debug, Default)]
struct Capture {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Forward every chunk to `echo` while keeping up to `limit` bytes.
///
/// A broken echo sink (e.g. a closed pipe) only stops the echo; capturing
/// goes on until the solution closes its stdout.
async fn tee<R, W>(reader: Option<R>, echo: &mut W, limit: usize) -> std::io::Result<Capture>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Capture::default());
    };

    let mut capture = Capture::default();
    let mut echoing = true;
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }

        if echoing {
            if let Err(e) = forward(echo, &buf[..n]).await {
                tracing::warn!(error = %e, "Echo sink failed, no longer echoing solution output");
                echoing = false;
            }
        }

        let room = limit.saturating_sub(capture.bytes.len());
        if room < n {
            capture.truncated = true;
        }
        capture.bytes.extend_from_slice(&buf[..n.min(room)]);
    }

    if capture.truncated {
        tracing::warn!(limit_bytes = limit, "Solution output truncated");
    }

    Ok(capture)
}

async fn forward<W: AsyncWrite + Unpin>(echo: &mut W, chunk: &[u8]) -> std::io::Result<()> {
    echo.write_all(chunk).await?;
    echo.flush().await
}

async fn collect<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Diagnostic text for an abnormal exit: the solution's stderr, or a
/// synthesized description when it printed nothing.
fn diagnostic(status: ExitStatus, stderr: &[u8]) -> String {
    let message = lossy_prefix(stderr, MAX_DIAGNOSTIC_BYTES);
    let message = message.trim_end();
    if !message.is_empty() {
        return message.to_string();
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Killed by signal {}", signal);
        }
    }

    match status.code() {
        Some(code) => format!("Process exited with code {}", code),
        None => "Process terminated abnormally".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(time_limit_ms: u64) -> Runner {
        Runner::new(ExecutionConfig {
            time_limit_ms,
            ..ExecutionConfig::default()
        })
    }

    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("solution.sh");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_completed_strips_trailing_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "read n\necho $((n * 2 + 3))\necho\n");

        let mut echo = Vec::new();
        let result = runner(5000)
            .execute(&solution, &InputSource::Text("3\n".to_string()), &mut echo)
            .await
            .unwrap();

        match result {
            ExecutionResult::Completed { stdout, .. } => assert_eq!(stdout, "9"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(echo, b"9\n\n");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "cat\necho done\n");

        let result = runner(5000)
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(matches!(result, ExecutionResult::Completed { ref stdout, .. } if stdout == "done"));
    }

    #[tokio::test]
    async fn test_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "cat\n");
        let input = dir.path().join("1.in");
        std::fs::write(&input, "line one\nline two\n").unwrap();

        let result = runner(5000)
            .execute(&solution, &InputSource::File(input), &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(
            matches!(result, ExecutionResult::Completed { ref stdout, .. } if stdout == "line one\nline two")
        );
    }

    #[tokio::test]
    async fn test_runtime_error_keeps_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "echo partial\necho 'boom' >&2\nexit 3\n");

        let result = runner(5000)
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap();

        match result {
            ExecutionResult::RuntimeError {
                exit_code,
                message,
                stdout,
                ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(message, "boom");
                assert_eq!(stdout, "partial");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_silent_failure_gets_synthesized_message() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "exit 7\n");

        let result = runner(5000)
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(matches!(
            result,
            ExecutionResult::RuntimeError { ref message, .. } if message == "Process exited with code 7"
        ));
    }

    #[tokio::test]
    async fn test_time_limit_kills_solution() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "sleep 5\necho late\n");

        let start = Instant::now();
        let result = runner(200)
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap();

        assert_eq!(result, ExecutionResult::TimeLimitExceeded { limit_ms: 200 });
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_runs_are_independent_and_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(
            dir.path(),
            "read a b\nif [ \"$a\" = crash ]; then exit 1; fi\necho $((a + b))\n",
        );
        let runner = runner(5000);
        let input = InputSource::Text("20 22\n".to_string());

        let first = runner
            .execute(&solution, &input, &mut tokio::io::sink())
            .await
            .unwrap();
        let crashed = runner
            .execute(&solution, &InputSource::Text("crash\n".to_string()), &mut tokio::io::sink())
            .await
            .unwrap();
        let second = runner
            .execute(&solution, &input, &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(matches!(crashed, ExecutionResult::RuntimeError { .. }));
        match (first, second) {
            (
                ExecutionResult::Completed { stdout: a, .. },
                ExecutionResult::Completed { stdout: b, .. },
            ) => {
                assert_eq!(a, "42");
                assert_eq!(a, b);
            }
            other => panic!("unexpected results: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unread_input_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "echo ignored input\n");
        let big = "1\n".repeat(200_000);

        let result = runner(5000)
            .execute(&solution, &InputSource::Text(big), &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(matches!(result, ExecutionResult::Completed { .. }));
    }

    #[tokio::test]
    async fn test_output_limit_truncates_capture_only() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "echo 0123456789\n");
        let runner = Runner::new(ExecutionConfig {
            output_limit_bytes: 4,
            ..ExecutionConfig::default()
        });

        let mut echo = Vec::new();
        let result = runner
            .execute(&solution, &InputSource::Empty, &mut echo)
            .await
            .unwrap();

        assert!(matches!(
            result,
            ExecutionResult::OutputLimitExceeded { limit_bytes: 4, ref stdout, .. } if stdout == "0123"
        ));
        assert_eq!(echo, b"0123456789\n");
    }

    #[tokio::test]
    async fn test_output_at_limit_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "printf 0123\n");
        let runner = Runner::new(ExecutionConfig {
            output_limit_bytes: 4,
            ..ExecutionConfig::default()
        });

        let result = runner
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap();

        assert!(matches!(result, ExecutionResult::Completed { ref stdout, .. } if stdout == "0123"));
    }

    /// Echo sink whose reader went away
    struct ClosedPipe;

    impl AsyncWrite for ClosedPipe {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_broken_echo_keeps_capturing() {
        let dir = tempfile::tempdir().unwrap();
        let solution = script(dir.path(), "echo first\necho second\n");

        let result = runner(5000)
            .execute(&solution, &InputSource::Empty, &mut ClosedPipe)
            .await
            .unwrap();

        assert!(matches!(
            result,
            ExecutionResult::Completed { ref stdout, .. } if stdout == "first\nsecond"
        ));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let solution = dir.path().join("solution.py");
        std::fs::write(&solution, "print(1)\n").unwrap();
        let runner = Runner::new(ExecutionConfig {
            python: "cph-no-such-python".to_string(),
            ..ExecutionConfig::default()
        });

        let err = runner
            .execute(&solution, &InputSource::Empty, &mut tokio::io::sink())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Launch(_)));
    }

    #[tokio::test]
    async fn test_missing_solution() {
        let dir = tempfile::tempdir().unwrap();
        let err = runner(5000)
            .execute(
                &dir.path().join("solution.sh"),
                &InputSource::Empty,
                &mut tokio::io::sink(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SolutionMissing(_)));
    }
}
