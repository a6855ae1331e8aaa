//! `do-restarting` binary entry point.

mod cli_app;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli_app::Cli::parse();
    do_restarting::logger::init(cli.debug);
    cli_app::run(&cli)
}
