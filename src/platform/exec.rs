//! Blocking subprocess execution bounded by a deadline.
//!
//! Children are placed in their own process group so a timeout can take down
//! everything a `sh -c` hook spawned, not just the shell.

#![allow(missing_docs)]

use std::io::{self, Read};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;

use crate::core::errors::StepFailure;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a bounded subprocess call ended.
#[derive(Debug)]
pub enum ExecError {
    /// The executable does not exist.
    NotFound,
    /// The deadline passed; the process group was killed.
    TimedOut,
    /// Any other spawn or wait failure.
    Io(io::Error),
}

impl ExecError {
    /// Fold into a per-daemon step failure.
    pub fn into_step_failure(self, program: &str, timeout: Duration) -> StepFailure {
        match self {
            Self::NotFound => StepFailure::NotFound {
                program: program.to_string(),
            },
            Self::TimedOut => StepFailure::Timeout {
                seconds: timeout.as_secs(),
            },
            Self::Io(err) => StepFailure::Spawn {
                details: err.to_string(),
            },
        }
    }
}

impl From<io::Error> for ExecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }
}

/// Captured result of [`run_captured`].
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command` with output discarded and return its exit status.
pub fn run_status(command: &mut Command, timeout: Duration) -> Result<ExitStatus, ExecError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0);
    let mut child = command.spawn()?;
    wait_with_deadline(&mut child, Instant::now() + timeout)
}

/// Run `command`, capturing stdout and stderr as lossy UTF-8.
///
/// The pipes are drained on helper threads so a chatty child cannot block on
/// a full pipe while we poll for its exit. A background grandchild holding a
/// pipe open past the deadline counts as a timeout and its group is killed.
pub fn run_captured(command: &mut Command, timeout: Duration) -> Result<CapturedOutput, ExecError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);
    let mut child = command.spawn()?;
    let deadline = Instant::now() + timeout;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = wait_with_deadline(&mut child, deadline)?;

    let (Some(stdout), Some(stderr)) = (collect(stdout, deadline), collect(stderr, deadline)) else {
        kill_process_group(child.id());
        return Err(ExecError::TimedOut);
    };

    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error just truncates what we report.
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// `None` when the pipe is still open at `deadline`.
fn collect(pipe: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(rx) = pipe else {
        return Some(String::new());
    };
    match rx.recv_deadline(deadline) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

fn wait_with_deadline(child: &mut Child, deadline: Instant) -> Result<ExitStatus, ExecError> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            kill_group(child);
            return Err(ExecError::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_group(child: &mut Child) {
    kill_process_group(child.id());
    // The group may already be gone; the direct kill is the fallback.
    let _ = child.kill();
    let _ = child.wait();
}

fn kill_process_group(leader: u32) {
    if let Ok(raw) = i32::try_from(leader) {
        let _ = killpg(Pid::from_raw(raw), Signal::SIGKILL);
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecError, run_captured, run_status};
    use std::process::Command;
    use std::time::{Duration, Instant};

    #[test]
    fn missing_program_is_not_found() {
        let result = run_status(
            &mut Command::new("/nonexistent/do-restarting-test-binary"),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(ExecError::NotFound)));
    }

    #[test]
    fn exit_code_is_reported() {
        let status = run_status(
            Command::new("sh").args(["-c", "exit 3"]),
            Duration::from_secs(5),
        )
        .expect("sh should run");
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn slow_child_times_out_and_is_killed() {
        let started = Instant::now();
        let result = run_status(
            Command::new("sh").args(["-c", "sleep 10"]),
            Duration::from_millis(200),
        );
        assert!(matches!(result, Err(ExecError::TimedOut)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn captured_output_contains_both_streams() {
        let out = run_captured(
            Command::new("sh").args(["-c", "echo hello; echo oops >&2; exit 1"]),
            Duration::from_secs(5),
        )
        .expect("sh should run");
        assert_eq!(out.status.code(), Some(1));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn background_child_holding_pipe_cannot_outlive_deadline() {
        let started = Instant::now();
        let result = run_captured(
            Command::new("sh").args(["-c", "echo '1 : /usr/sbin/sshd -D'; sleep 4 &"]),
            Duration::from_millis(300),
        );
        assert!(matches!(result, Err(ExecError::TimedOut)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
