//! Linux implementations: `needs-restarting`, `systemctl`, `sh -c`.

#![allow(missing_docs)]

use std::process::Command;
use std::time::Duration;

use tracing::warn;

use super::exec::{ExecError, run_captured, run_status};
use super::pal::{HOOK_TIMEOUT, HookRunner, INSPECTOR_TIMEOUT, Inspector, RESTART_TIMEOUT, ServiceManager};
use crate::core::errors::{DrError, Result, StepFailure};

pub const DEFAULT_INSPECTOR: &str = "needs-restarting";
pub const DEFAULT_SERVICE_MANAGER: &str = "systemctl";

/// Inspector stderr produced when a process exits between being listed and
/// being examined. The scan itself is still usable.
const TRANSIENT_INSPECTOR_ERRORS: &[&str] = &[
    "Failed to read PID",
    "[Errno 2] No such file or directory",
    "[Errno 3] No such process",
];

fn is_transient_inspector_error(stderr: &str) -> bool {
    TRANSIENT_INSPECTOR_ERRORS
        .iter()
        .any(|prefix| stderr.starts_with(prefix))
}

/// `needs-restarting` from dnf/yum-utils.
#[derive(Debug, Clone)]
pub struct NeedsRestarting {
    program: String,
    timeout: Duration,
}

impl NeedsRestarting {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: INSPECTOR_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for NeedsRestarting {
    fn default() -> Self {
        Self::new(DEFAULT_INSPECTOR)
    }
}

impl Inspector for NeedsRestarting {
    fn findings(&self) -> Result<Vec<String>> {
        let output = run_captured(&mut Command::new(&self.program), self.timeout).map_err(|err| {
            match err {
                ExecError::NotFound => DrError::InspectorMissing {
                    program: self.program.clone(),
                },
                ExecError::TimedOut => DrError::InspectorTimeout {
                    program: self.program.clone(),
                    timeout: self.timeout,
                },
                ExecError::Io(source) => DrError::Runtime {
                    details: format!("{} could not be run: {source}", self.program),
                },
            }
        })?;

        if !output.status.success() {
            let stderr = output.stderr.trim();
            if is_transient_inspector_error(stderr) {
                warn!(
                    "{} reported a vanished process, continuing: {stderr}",
                    self.program
                );
            } else {
                return Err(DrError::InspectorFailed {
                    program: self.program.clone(),
                    code: output.status.code().unwrap_or(-1),
                    stderr: stderr.to_string(),
                });
            }
        }

        Ok(output.stdout.lines().map(str::to_string).collect())
    }
}

/// `systemctl restart <daemon>`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    timeout: Duration,
}

impl Systemctl {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: RESTART_TIMEOUT,
        }
    }
}

impl Default for Systemctl {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_MANAGER)
    }
}

impl ServiceManager for Systemctl {
    fn restart(&self, daemon: &str) -> std::result::Result<(), StepFailure> {
        let status = run_status(
            Command::new(&self.program).arg("restart").arg(daemon),
            self.timeout,
        )
        .map_err(|err| err.into_step_failure(&self.program, self.timeout))?;
        if status.success() {
            Ok(())
        } else {
            Err(StepFailure::Exit {
                code: status.code(),
            })
        }
    }
}

/// Runs hook commands with `sh -c`, inheriting the environment.
#[derive(Debug, Clone)]
pub struct ShellHooks {
    timeout: Duration,
}

impl ShellHooks {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ShellHooks {
    fn default() -> Self {
        Self::with_timeout(HOOK_TIMEOUT)
    }
}

impl HookRunner for ShellHooks {
    fn run(&self, command: &str) -> std::result::Result<(), StepFailure> {
        let status = run_status(Command::new("sh").arg("-c").arg(command), self.timeout)
            .map_err(|err| err.into_step_failure("sh", self.timeout))?;
        if status.success() {
            Ok(())
        } else {
            Err(StepFailure::Exit {
                code: status.code(),
            })
        }
    }
}
