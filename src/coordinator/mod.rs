//! One run: inspector scan → name resolution → policy filter → restarts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::ServiceSchedule;
use crate::core::errors::Result;
use crate::orchestrator::{DaemonOutcome, RestartOrchestrator, RestartOutcome};
use crate::platform::pal::Inspector;
use crate::policy::DaemonPolicy;
use crate::resolver::{DaemonResolver, Resolution, command_descriptor};
use crate::schedule::WallClock;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Structured report from one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Whether restarts were suppressed.
    pub dry_run: bool,
    /// One entry per candidate daemon that passed the denylist.
    pub outcomes: Vec<DaemonOutcome>,
    /// Command descriptors no mapping entry matched.
    pub unknown_processes: Vec<String>,
    /// Findings that mapped to a process with no restartable unit.
    pub unmanaged_processes: usize,
    /// Candidates dropped because the denylist names them.
    pub policy_skipped: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn restarted(&self) -> usize {
        self.count(RestartOutcome::is_restarted)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(RestartOutcome::is_failure)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(RestartOutcome::is_skipped)
    }

    fn count(&self, pred: impl Fn(&RestartOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    /// The outcome recorded for `daemon`, if it was a candidate.
    #[must_use]
    pub fn outcome(&self, daemon: &str) -> Option<&RestartOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.daemon == daemon)
            .map(|o| &o.outcome)
    }
}

/// Format a run report for terminal output.
#[must_use]
pub fn format_run_report(report: &RunReport) -> String {
    let mut out = String::new();

    for daemon in &report.outcomes {
        let icon = match &daemon.outcome {
            RestartOutcome::Restarted {
                post_hook_failure: Some(_),
                ..
            } => "[WARN]",
            RestartOutcome::Restarted { dry_run: true, .. } => "[PLAN]",
            RestartOutcome::Restarted { .. } => "[ OK ]",
            RestartOutcome::Skipped { .. } => "[SKIP]",
            RestartOutcome::PreHookFailed { .. } | RestartOutcome::RestartFailed { .. } => {
                "[FAIL]"
            }
        };
        let _ = writeln!(out, "  {icon} {}", daemon.daemon);
        for step in daemon.steps.iter().filter(|s| s.error.is_some()) {
            if let Some(err) = &step.error {
                let _ = writeln!(out, "         {}: {err}", step.description);
            }
        }
    }

    if !report.policy_skipped.is_empty() {
        let _ = writeln!(out, "  Denylisted: {}", report.policy_skipped.join(", "));
    }

    let _ = writeln!(out);
    if report.outcomes.is_empty() {
        let _ = writeln!(out, "No daemons need restarting.");
    } else {
        let _ = writeln!(
            out,
            "{} restarted, {} failed, {} skipped.",
            report.restarted(),
            report.failed(),
            report.skipped()
        );
    }
    if report.dry_run {
        let _ = writeln!(out, "Dry-run complete. No services were restarted.");
    }

    out
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Wires the inspector, resolver, policy and orchestrator together.
pub struct RunCoordinator<'a> {
    inspector: &'a dyn Inspector,
    resolver: &'a DaemonResolver,
    policy: &'a DaemonPolicy,
    schedules: &'a BTreeMap<String, ServiceSchedule>,
    orchestrator: &'a RestartOrchestrator<'a>,
}

impl<'a> RunCoordinator<'a> {
    #[must_use]
    pub fn new(
        inspector: &'a dyn Inspector,
        resolver: &'a DaemonResolver,
        policy: &'a DaemonPolicy,
        schedules: &'a BTreeMap<String, ServiceSchedule>,
        orchestrator: &'a RestartOrchestrator<'a>,
    ) -> Self {
        Self {
            inspector,
            resolver,
            policy,
            schedules,
            orchestrator,
        }
    }

    /// Execute one run at wall-clock time `now`.
    ///
    /// Only an inspector failure is returned as an error, and then before any
    /// daemon has been touched.
    pub fn run(&self, now: WallClock) -> Result<RunReport> {
        let findings = self.inspector.findings()?;

        let mut report = RunReport {
            dry_run: self.orchestrator.is_dry_run(),
            ..RunReport::default()
        };

        let mut candidates = BTreeSet::new();
        for line in &findings {
            match self.resolver.resolve_line(line) {
                Resolution::Daemon(daemon) => {
                    candidates.insert(daemon.to_string());
                }
                Resolution::Unmanaged => {
                    debug!("Skipping {} (<no daemon process>)", line.trim());
                    report.unmanaged_processes += 1;
                }
                Resolution::NotFound => {
                    let command = command_descriptor(line).unwrap_or_default();
                    debug!("Unknown process {command}");
                    report.unknown_processes.push(command.to_string());
                }
                Resolution::Malformed => {
                    debug!("Skipping output line '{line}'");
                }
            }
        }

        candidates.retain(|daemon| {
            if self.policy.denies(daemon) {
                debug!("Skipping {daemon} (denylisted)");
                report.policy_skipped.push(daemon.clone());
                false
            } else {
                true
            }
        });

        if candidates.is_empty() {
            info!("No daemons need to be restarted");
        }

        for daemon in &candidates {
            let outcome = self
                .orchestrator
                .process(daemon, self.schedules.get(daemon), now);
            report.outcomes.push(outcome);
        }

        info!(
            "Run complete: {} restarted, {} failed, {} skipped",
            report.restarted(),
            report.failed(),
            report.skipped()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{RunCoordinator, format_run_report};
    use crate::core::config::ServiceSchedule;
    use crate::core::errors::{DrError, Result, StepFailure};
    use crate::orchestrator::tests::{RecordingHooks, RecordingServices};
    use crate::orchestrator::{RestartOrchestrator, RestartOutcome};
    use crate::platform::pal::Inspector;
    use crate::policy::DaemonPolicy;
    use crate::resolver::DaemonResolver;
    use crate::schedule::WallClock;
    use std::cell::Cell;
    use std::collections::{BTreeMap, BTreeSet, HashMap};
    use std::time::Duration;

    struct FixedInspector(Vec<&'static str>);

    impl Inspector for FixedInspector {
        fn findings(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| (*s).to_string()).collect())
        }
    }

    struct TimedOutInspector {
        calls: Cell<usize>,
    }

    impl Inspector for TimedOutInspector {
        fn findings(&self) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Err(DrError::InspectorTimeout {
                program: "needs-restarting".to_string(),
                timeout: Duration::from_secs(30),
            })
        }
    }

    const FINDINGS: &[&str] = &[
        "1 : /usr/lib/systemd/systemd --switched-root --system --deserialize 31",
        "812 : /usr/sbin/sshd -D",
        "813 : /usr/sbin/sshd -D -R",
        "990 : sshd: admin [priv]",
        "1020 : /usr/sbin/crond -n",
        "1100 : /usr/sbin/httpd -DFOREGROUND",
        "1200 : /opt/custom/bin/thing --serve",
        "Updating Subscription Management repositories.",
    ];

    fn resolver() -> DaemonResolver {
        DaemonResolver::builtin().expect("builtin table compiles")
    }

    #[test]
    fn filters_dedupes_and_restarts() {
        let inspector = FixedInspector(FINDINGS.to_vec());
        let resolver = resolver();
        let policy = DaemonPolicy::default();
        let schedules = BTreeMap::new();
        let services = RecordingServices::default();
        let hooks = RecordingHooks::default();
        let orchestrator = RestartOrchestrator::new(&services, &hooks);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        let report = coordinator.run(WallClock::new(2, 10)).expect("run succeeds");

        assert_eq!(*services.calls.borrow(), vec!["crond", "sshd"]);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.restarted(), 2);
        assert_eq!(report.policy_skipped, vec!["httpd", "systemd"]);
        assert_eq!(report.unknown_processes, vec!["/opt/custom/bin/thing --serve"]);
        assert_eq!(report.unmanaged_processes, 1);
        assert!(report.outcome("httpd").is_none());
        assert!(report.outcome("systemd").is_none());
    }

    #[test]
    fn denylisted_daemon_never_reaches_orchestrator() {
        let inspector = FixedInspector(vec!["5 : /usr/sbin/chronyd -F 2"]);
        let resolver = resolver();
        let deny = BTreeSet::from(["chronyd".to_string()]);
        let policy = DaemonPolicy::from_overrides(&deny, &BTreeSet::new());
        // A schedule that would otherwise allow it must not matter.
        let schedules = BTreeMap::from([("chronyd".to_string(), ServiceSchedule::default())]);
        let services = RecordingServices::default();
        let hooks = RecordingHooks::default();
        let orchestrator = RestartOrchestrator::new(&services, &hooks);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        let report = coordinator.run(WallClock::new(0, 0)).expect("run succeeds");

        assert!(report.outcomes.is_empty());
        assert!(services.calls.borrow().is_empty());
        assert_eq!(report.policy_skipped, vec!["chronyd"]);
    }

    #[test]
    fn whitelist_allows_builtin_denied_daemon() {
        let inspector = FixedInspector(vec!["1100 : /usr/sbin/httpd -DFOREGROUND"]);
        let resolver = resolver();
        let allow = BTreeSet::from(["httpd".to_string()]);
        let policy = DaemonPolicy::from_overrides(&BTreeSet::new(), &allow);
        let schedules = BTreeMap::new();
        let services = RecordingServices::default();
        let hooks = RecordingHooks::default();
        let orchestrator = RestartOrchestrator::new(&services, &hooks);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        coordinator.run(WallClock::new(0, 0)).expect("run succeeds");

        assert_eq!(*services.calls.borrow(), vec!["httpd"]);
    }

    #[test]
    fn inspector_timeout_aborts_before_any_restart() {
        let inspector = TimedOutInspector { calls: Cell::new(0) };
        let resolver = resolver();
        let policy = DaemonPolicy::default();
        let schedules = BTreeMap::new();
        let services = RecordingServices::default();
        let hooks = RecordingHooks::default();
        let orchestrator = RestartOrchestrator::new(&services, &hooks);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        let err = coordinator
            .run(WallClock::new(0, 0))
            .expect_err("timeout is fatal");

        assert!(matches!(err, DrError::InspectorTimeout { .. }));
        assert_eq!(inspector.calls.get(), 1);
        assert!(services.calls.borrow().is_empty());
        assert!(hooks.calls.borrow().is_empty());
    }

    #[test]
    fn per_daemon_failures_do_not_stop_the_run() {
        let inspector = FixedInspector(vec![
            "812 : /usr/sbin/sshd -D",
            "1020 : /usr/sbin/crond -n",
            "1300 : /usr/sbin/chronyd -F 2",
        ]);
        let resolver = resolver();
        let policy = DaemonPolicy::default();
        let schedules = BTreeMap::from([(
            "crond".to_string(),
            ServiceSchedule {
                pre: vec!["prepare-cron".to_string()],
                ..ServiceSchedule::default()
            },
        )]);
        let services = RecordingServices {
            failing: HashMap::from([(
                "chronyd".to_string(),
                StepFailure::Exit { code: Some(1) },
            )]),
            ..RecordingServices::default()
        };
        let hooks = RecordingHooks {
            failing: HashMap::from([(
                "prepare-cron".to_string(),
                StepFailure::Exit { code: Some(3) },
            )]),
            ..RecordingHooks::default()
        };
        let orchestrator = RestartOrchestrator::new(&services, &hooks);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        let report = coordinator.run(WallClock::new(0, 0)).expect("run succeeds");

        assert!(matches!(
            report.outcome("crond"),
            Some(RestartOutcome::PreHookFailed { .. })
        ));
        assert!(matches!(
            report.outcome("chronyd"),
            Some(RestartOutcome::RestartFailed { .. })
        ));
        assert!(matches!(
            report.outcome("sshd"),
            Some(RestartOutcome::Restarted { .. })
        ));
        assert_eq!(report.failed(), 2);
        assert_eq!(*services.calls.borrow(), vec!["chronyd", "sshd"]);

        let text = format_run_report(&report);
        assert!(text.contains("[FAIL] crond"));
        assert!(text.contains("[ OK ] sshd"));
        assert!(text.contains("1 restarted, 2 failed, 0 skipped."));
    }

    #[test]
    fn empty_scan_reports_nothing_to_do() {
        let inspector = FixedInspector(Vec::new());
        let resolver = resolver();
        let policy = DaemonPolicy::default();
        let schedules = BTreeMap::new();
        let services = RecordingServices::default();
        let hooks = RecordingHooks::default();
        let orchestrator = RestartOrchestrator::new(&services, &hooks).dry_run(true);
        let coordinator =
            RunCoordinator::new(&inspector, &resolver, &policy, &schedules, &orchestrator);

        let report = coordinator.run(WallClock::new(0, 0)).expect("run succeeds");

        assert!(report.dry_run);
        let text = format_run_report(&report);
        assert!(text.contains("No daemons need restarting."));
        assert!(text.contains("Dry-run complete"));
    }
}
