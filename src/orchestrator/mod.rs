//! Per-daemon restart sequence: schedule gate, pre hook, restart, post hook.
//!
//! Every daemon is handled on its own; whatever happens to one never stops the
//! next. Only a failed pre hook prevents the service manager from being
//! called. A failed post hook is reported but leaves the daemon counted as
//! restarted.

#![allow(missing_docs)]

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::config::ServiceSchedule;
use crate::core::errors::StepFailure;
use crate::platform::pal::{HookRunner, ServiceManager};
use crate::schedule::{WallClock, check_dow, check_hour};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a daemon was left alone this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "window", rename_all = "snake_case")]
pub enum SkipReason {
    /// Current weekday is outside the `dow` list.
    DayOfWeek { current: u32, allowed: Vec<String> },
    /// Current hour is outside the `hours` list.
    Hour { current: u32, allowed: Vec<String> },
}

/// Terminal state of one daemon's restart sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RestartOutcome {
    /// Outside the configured window; nothing was run.
    Skipped { reason: SkipReason },
    /// The pre hook failed; the service manager was not called.
    PreHookFailed { failure: StepFailure },
    /// The service manager failed.
    RestartFailed { failure: StepFailure },
    /// The service manager succeeded (or was suppressed in dry mode).
    /// `post_hook_failure` is informational only.
    Restarted {
        dry_run: bool,
        post_hook_failure: Option<StepFailure>,
    },
}

impl RestartOutcome {
    /// Whether this outcome counts against the run.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::PreHookFailed { .. } | Self::RestartFailed { .. })
    }

    #[must_use]
    pub const fn is_restarted(&self) -> bool {
        matches!(self, Self::Restarted { .. })
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// A single step attempted for a daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartStep {
    /// Human-readable description.
    pub description: String,
    /// Whether this step completed successfully.
    pub done: bool,
    /// Error message if the step failed.
    pub error: Option<String>,
}

/// Outcome plus the steps that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaemonOutcome {
    pub daemon: String,
    pub outcome: RestartOutcome,
    pub steps: Vec<RestartStep>,
}

/// Steps recorded so far for a daemon still in progress.
struct Progress {
    daemon: String,
    steps: Vec<RestartStep>,
}

impl Progress {
    fn new(daemon: &str) -> Self {
        Self {
            daemon: daemon.to_string(),
            steps: Vec::new(),
        }
    }

    fn step_ok(&mut self, description: impl Into<String>) {
        self.steps.push(RestartStep {
            description: description.into(),
            done: true,
            error: None,
        });
    }

    fn step_fail(&mut self, description: impl Into<String>, error: impl Into<String>) {
        self.steps.push(RestartStep {
            description: description.into(),
            done: false,
            error: Some(error.into()),
        });
    }

    fn finish(self, outcome: RestartOutcome) -> DaemonOutcome {
        DaemonOutcome {
            daemon: self.daemon,
            outcome,
            steps: self.steps,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives daemons through the restart sequence, one at a time.
pub struct RestartOrchestrator<'a> {
    services: &'a dyn ServiceManager,
    hooks: &'a dyn HookRunner,
    dry_run: bool,
}

impl<'a> RestartOrchestrator<'a> {
    #[must_use]
    pub fn new(services: &'a dyn ServiceManager, hooks: &'a dyn HookRunner) -> Self {
        Self {
            services,
            hooks,
            dry_run: false,
        }
    }

    /// Perform every decision but never call the service manager.
    /// Hooks still run.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run the full sequence for `daemon`. `schedule` is `None` when the
    /// daemon has no configuration section.
    pub fn process(
        &self,
        daemon: &str,
        schedule: Option<&ServiceSchedule>,
        now: WallClock,
    ) -> DaemonOutcome {
        let mut report = Progress::new(daemon);
        let empty = ServiceSchedule::default();
        let schedule = schedule.unwrap_or(&empty);

        // Step 1: Restart window.
        if let Some(reason) = window_gate(daemon, schedule, now) {
            report.step_ok(format!("Outside restart window: {}", describe_skip(&reason)));
            return report.finish(RestartOutcome::Skipped { reason });
        }

        // Step 2: Pre hook.
        if let Some(cmd) = schedule.pre_command() {
            debug!("Running pre command {cmd} ...");
            match self.hooks.run(cmd) {
                Ok(()) => {
                    info!("{daemon} pre command executed successfully ({cmd})");
                    report.step_ok(format!("Pre command: {cmd}"));
                }
                Err(failure) => {
                    error!("Failed to restart {daemon}: pre command {cmd} {failure}");
                    report.step_fail(format!("Pre command: {cmd}"), failure.to_string());
                    return report.finish(RestartOutcome::PreHookFailed { failure });
                }
            }
        }

        // Step 3: Restart.
        debug!("Restarting {daemon} ...");
        if self.dry_run {
            info!("Dry run: restart of {daemon} suppressed");
            report.step_ok(format!("Restart {daemon} (dry run)"));
        } else {
            match self.services.restart(daemon) {
                Ok(()) => {
                    info!("Successfully restarted {daemon}");
                    report.step_ok(format!("Restart {daemon}"));
                }
                Err(failure) => {
                    error!("Failed to restart {daemon} ({failure})");
                    report.step_fail(format!("Restart {daemon}"), failure.to_string());
                    return report.finish(RestartOutcome::RestartFailed { failure });
                }
            }
        }

        // Step 4: Post hook. Failure is logged, the restart stands.
        let mut post_hook_failure = None;
        if let Some(cmd) = schedule.post_command() {
            debug!("Running post command {cmd} ...");
            match self.hooks.run(cmd) {
                Ok(()) => {
                    info!("{daemon} post command executed successfully ({cmd})");
                    report.step_ok(format!("Post command: {cmd}"));
                }
                Err(failure) => {
                    error!("{daemon} post command {cmd} {failure}");
                    report.step_fail(format!("Post command: {cmd}"), failure.to_string());
                    post_hook_failure = Some(failure);
                }
            }
        }

        report.finish(RestartOutcome::Restarted {
            dry_run: self.dry_run,
            post_hook_failure,
        })
    }
}

/// `Some(reason)` when `now` is outside a configured window. Unparseable
/// windows warn and let the restart through.
fn window_gate(daemon: &str, schedule: &ServiceSchedule, now: WallClock) -> Option<SkipReason> {
    if !schedule.dow.is_empty() {
        debug!("Day of week configured for service {daemon}: {:?}", schedule.dow);
        match check_dow(now.dow, schedule.dow.as_slice()) {
            Ok(true) => info!("{daemon} configured for restart in {:?}", schedule.dow),
            Ok(false) => {
                let reason = SkipReason::DayOfWeek {
                    current: now.dow,
                    allowed: schedule.dow.clone(),
                };
                info!("Skipping restart of {daemon}: {}", describe_skip(&reason));
                return Some(reason);
            }
            Err(err) => warn!(
                "Invalid value in day of week parameter for service {daemon} ({:?}): {err}",
                schedule.dow
            ),
        }
    }

    if !schedule.hours.is_empty() {
        debug!("Hours configured for service {daemon}: {:?}", schedule.hours);
        match check_hour(now.hour, schedule.hours.as_slice()) {
            Ok(true) => info!("{daemon} configured for restart in {:?}", schedule.hours),
            Ok(false) => {
                let reason = SkipReason::Hour {
                    current: now.hour,
                    allowed: schedule.hours.clone(),
                };
                info!("Skipping restart of {daemon}: {}", describe_skip(&reason));
                return Some(reason);
            }
            Err(err) => warn!(
                "Invalid value in hours parameter for service {daemon} ({:?}): {err}",
                schedule.hours
            ),
        }
    }

    None
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::DayOfWeek { current, allowed } => {
            format!("current day of week {current} is not in {allowed:?}")
        }
        SkipReason::Hour { current, allowed } => {
            format!("current hour {current} is not in {allowed:?}")
        }
    }
}
