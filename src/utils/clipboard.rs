//! Best-effort clipboard support

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Clipboard programs tried in order
const CLIPBOARD_COMMANDS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
];

/// Copy `text` to the system clipboard.
///
/// Returns whether any clipboard program accepted the text. Failures are
/// logged at debug level and never surface as errors.
pub async fn copy(text: &str) -> bool {
    for argv in CLIPBOARD_COMMANDS {
        match pipe_into(argv, text).await {
            Ok(true) => return true,
            Ok(false) => tracing::debug!(program = argv[0], "clipboard program failed"),
            Err(e) => tracing::debug!(program = argv[0], error = %e, "clipboard program unavailable"),
        }
    }
    false
}

async fn pipe_into(argv: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }

    Ok(child.wait().await?.success())
}
