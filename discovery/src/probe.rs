//! Running command lines through the platform shell.
//!
//! Used to capture `<command> --help` output. The probe is blocking; async
//! callers should run it on a blocking thread.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use wait_timeout::ChildExt;

/// Default time a probed process may run before it is killed.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe failures.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The command line contains characters the shell would interpret.
    #[error("rejected command line with shell metacharacters: {0}")]
    Rejected(String),
    /// The shell could not be started.
    #[error("failed to spawn shell: {0}")]
    Spawn(#[source] std::io::Error),
    /// Waiting on the child failed.
    #[error("failed to wait for command: {0}")]
    Wait(#[source] std::io::Error),
    /// The command did not exit in time and was killed.
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
}

/// Returns `true` if `value` contains characters with shell meaning.
///
/// Probed command lines are built from user-typed tokens; anything that
/// could chain, redirect or substitute is refused.
pub fn contains_shell_metacharacters(value: &str) -> bool {
    value.chars().any(|ch| {
        matches!(
            ch,
            ';' | '&' | '|' | '`' | '$' | '(' | ')' | '<' | '>' | '\\' | '\n' | '\r' | '"' | '\''
                | '*' | '?' | '{' | '}'
        )
    })
}

/// Runs `command_line` via `sh -c` (or `cmd /C` on Windows) and returns
/// stdout followed by stderr.
///
/// Many tools print help on stderr, so both streams are kept. The exit
/// status is ignored; only a spawn failure or timeout is an error.
pub fn run_shell_command(command_line: &str, timeout: Duration) -> Result<String, ProbeError> {
    if contains_shell_metacharacters(command_line) {
        return Err(ProbeError::Rejected(command_line.to_string()));
    }

    let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
    let mut child = Command::new(shell)
        .arg(flag)
        .arg(command_line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ProbeError::Spawn)?;

    // Drain both pipes while waiting so a full buffer cannot stall the child.
    let stdout_thread = child.stdout.take().map(drain);
    let stderr_thread = child.stderr.take().map(drain);

    let status = child.wait_timeout(timeout).map_err(ProbeError::Wait)?;
    if status.is_none() {
        let _ = child.kill();
        let _ = child.wait();
        debug!(command = command_line, ?timeout, "Probe timed out");
        return Err(ProbeError::Timeout(timeout));
    }

    let stdout = collect(stdout_thread);
    let stderr = collect(stderr_thread);
    debug!(
        command = command_line,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "Probe finished"
    );

    Ok(match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (false, false) => format!("{stdout}\n{stderr}"),
        (false, true) => stdout,
        (true, _) => stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|thread| thread.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metacharacters_detected() {
        assert!(contains_shell_metacharacters("ls; rm -rf /"));
        assert!(contains_shell_metacharacters("echo $(id)"));
        assert!(!contains_shell_metacharacters("git remote add --help"));
    }

    #[test]
    fn test_rejected_before_spawn() {
        let err = run_shell_command("echo hi && echo there", DEFAULT_PROBE_TIMEOUT).unwrap_err();
        assert!(matches!(err, ProbeError::Rejected(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let output = run_shell_command("echo hello", DEFAULT_PROBE_TIMEOUT).unwrap();
        assert_eq!(output.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_command_reports_stderr() {
        let output =
            run_shell_command("shellsense-definitely-missing-cmd --help", DEFAULT_PROBE_TIMEOUT)
                .unwrap();
        assert!(!output.trim().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let err = run_shell_command("sleep 5", Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
    }
}
