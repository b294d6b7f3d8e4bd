//! Shared subprocess execution for tool-backed codecs.

use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::error::CodecError;

/// Runs an external tool with a wall-clock budget.
///
/// A missing binary maps to `ToolNotFound`; exceeding the budget kills the
/// child and maps to `Timeout`. Exit status handling is left to the caller
/// so it can attach stage-specific context.
pub(crate) async fn run_tool(
    program: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<Output, CodecError> {
    let future = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    match timeout(Duration::from_secs(timeout_secs), future).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(CodecError::ToolNotFound {
            path: program.to_path_buf(),
        }),
        Ok(Err(e)) => Err(CodecError::Io(e)),
        Err(_) => Err(CodecError::Timeout { timeout_secs }),
    }
}

/// Extracts a printable stderr tail from a tool invocation.
pub(crate) fn stderr_tail(output: &Output) -> Option<String> {
    if output.stderr.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stderr);
    let tail: Vec<&str> = text.lines().rev().take(10).collect();
    Some(tail.into_iter().rev().collect::<Vec<_>>().join("\n"))
}
