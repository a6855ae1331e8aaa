//! Platform abstraction layer: the external programs the restart engine drives.
//!
//! Each collaborator is a trait so the coordinator and orchestrator can be
//! exercised with in-memory fakes.

use std::time::Duration;

use crate::core::errors::{Result, StepFailure};

/// Seconds allowed for a pre/post hook.
pub const HOOK_TIMEOUT: Duration = Duration::from_secs(60);
/// Seconds allowed for a service manager restart.
pub const RESTART_TIMEOUT: Duration = Duration::from_secs(60);
/// Seconds allowed for the inspector scan.
pub const INSPECTOR_TIMEOUT: Duration = Duration::from_secs(30);

/// Reports processes that still map deleted/updated files.
pub trait Inspector {
    /// One `<descriptor>: <command line>` finding per element.
    ///
    /// Any error returned here is fatal for the run.
    fn findings(&self) -> Result<Vec<String>>;
}

/// Restarts a service unit by its canonical name.
pub trait ServiceManager {
    /// Restart `daemon`; the name is passed through verbatim.
    fn restart(&self, daemon: &str) -> std::result::Result<(), StepFailure>;
}

/// Runs a pre/post hook command line through a shell.
pub trait HookRunner {
    /// Output is discarded; only the exit status matters.
    fn run(&self, command: &str) -> std::result::Result<(), StepFailure>;
}
