//! Subprocess execution with a deadline.
//!
//! Both output pipes are drained on helper threads so a chatty child can
//! never stall on a full pipe while we poll it.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use packager_core::{application::ApplicationError, error::PackagerError};
use thiserror::Error;
use tracing::{debug, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Failures to run a child to completion.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
}

impl From<ProcessError> for PackagerError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::TimedOut { program, timeout } => ApplicationError::TimedOut {
                program,
                seconds: timeout.as_secs(),
            }
            .into(),
            ProcessError::Spawn { program, source } | ProcessError::Wait { program, source } => {
                ApplicationError::ProcessFailed {
                    program,
                    reason: source.to_string(),
                }
                .into()
            }
        }
    }
}

/// Run `command` to completion or kill it at `timeout`.
///
/// With `echo`, both streams are copied to our stderr as they arrive, in
/// addition to being captured.
pub fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
    echo: bool,
) -> Result<ProcessOutput, ProcessError> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(
        %program,
        args = ?command.get_args().collect::<Vec<_>>(),
        timeout_secs = timeout.as_secs(),
        "Spawning"
    );

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = child.stdout.take().map(|pipe| drain(pipe, echo));
    let stderr = child.stderr.take().map(|pipe| drain(pipe, echo));

    let status = wait_until(&mut child, Instant::now() + timeout).map_err(|e| match e {
        WaitError::Deadline => ProcessError::TimedOut {
            program: program.clone(),
            timeout,
        },
        WaitError::Io(source) => ProcessError::Wait {
            program: program.clone(),
            source,
        },
    })?;

    let output = ProcessOutput {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    };
    trace!(%program, status = %output.status, "Process finished");
    Ok(output)
}

enum WaitError {
    Deadline,
    Io(io::Error),
}

fn wait_until(child: &mut Child, deadline: Instant) -> Result<ExitStatus, WaitError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                warn!(pid = child.id(), "Deadline reached, killing child");
                kill(child);
                return Err(WaitError::Deadline);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                kill(child);
                return Err(WaitError::Io(e));
            }
        }
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "Kill failed (child already exited?)");
    }
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(mut pipe: R, echo: bool) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut captured = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if echo {
                        let mut err = io::stderr().lock();
                        let _ = err.write_all(&buf[..n]);
                        let _ = err.flush();
                    }
                    captured.extend_from_slice(&buf[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        captured
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn captures_both_streams() {
        let out = run_with_timeout(sh("echo out; echo err >&2"), Duration::from_secs(10), false)
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[test]
    fn failure_status_is_not_an_error() {
        let out = run_with_timeout(sh("exit 3"), Duration::from_secs(10), false).unwrap();
        assert!(!out.success());
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn large_output_does_not_block() {
        let out = run_with_timeout(
            sh("i=0; while [ $i -lt 20000 ]; do echo line-$i >&2; i=$((i+1)); done"),
            Duration::from_secs(30),
            false,
        )
        .unwrap();
        assert!(out.stderr.ends_with("line-19999\n"));
    }

    #[test]
    fn deadline_kills_child() {
        let started = Instant::now();
        let err = run_with_timeout(sh("exec sleep 30"), Duration::from_millis(200), false)
            .unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = run_with_timeout(
            Command::new("definitely-not-a-real-program-xyz"),
            Duration::from_secs(1),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        let converted: PackagerError = err.into();
        assert!(converted.to_string().contains("definitely-not-a-real-program-xyz"));
    }
}
