//! Top-level CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use do_restarting::coordinator::{RunCoordinator, format_run_report};
use do_restarting::core::config::Config;
use do_restarting::orchestrator::RestartOrchestrator;
use do_restarting::platform::linux::{NeedsRestarting, ShellHooks, Systemctl};
use do_restarting::resolver::DaemonResolver;
use do_restarting::schedule::WallClock;

/// Restart all services that need to be restarted.
#[derive(Parser, Debug)]
#[command(name = "do-restarting", version, about)]
pub struct Cli {
    /// Generate additional debug information. Services are not restarted.
    #[arg(short, long)]
    pub debug: bool,

    /// Configuration file (default: /usr/local/etc/do-restarting.conf).
    #[arg(short, long, value_name = "PATH")]
    pub configfile: Option<PathBuf>,

    /// Make every decision and run hooks, but do not restart services.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the run report as JSON when done.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Debug mode never restarts anything.
    #[must_use]
    pub const fn dry_execution(&self) -> bool {
        self.debug || self.dry_run
    }
}

/// Execute one run. Only a failed inspector scan yields a failing exit code.
pub fn run(cli: &Cli) -> ExitCode {
    if cli.debug {
        debug!("Running in debug mode. Processes will not be restarted!");
    }

    let config_path = Config::resolve_path(cli.configfile.as_deref());
    let config = Config::load(&config_path).unwrap_or_else(|err| {
        error!("Unable to parse configuration file {}: {err}", config_path.display());
        Config::default()
    });

    // Merged exactly once; every later check reads this set.
    let policy = config.main.policy();
    debug!("Denylist is {:?}", policy.iter().collect::<Vec<_>>());

    let resolver = match DaemonResolver::builtin() {
        Ok(resolver) => resolver,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let inspector = NeedsRestarting::new(config.main.inspector.as_str());
    let services = Systemctl::new(config.main.service_manager.as_str());
    let hooks = ShellHooks::default();
    let orchestrator = RestartOrchestrator::new(&services, &hooks).dry_run(cli.dry_execution());
    let coordinator = RunCoordinator::new(
        &inspector,
        &resolver,
        &policy,
        &config.services,
        &orchestrator,
    );

    let report = match coordinator.run(WallClock::now()) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => error!("Unable to serialize run report: {err}"),
        }
    } else if cli.debug {
        print!("{}", format_run_report(&report));
    }

    ExitCode::SUCCESS
}
