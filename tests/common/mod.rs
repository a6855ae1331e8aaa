//! Shared harness for driving the `do-restarting` binary from integration tests.
//!
//! Every case writes its command line and captured output to a log file under
//! the target directory so failures can be inspected after the fact.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn log_dir() -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    fs::create_dir_all(&dir).expect("create log dir");
    dir
}

pub fn run_cli_case(case: &str, args: &[&str]) -> CliResult {
    let output = Command::new(env!("CARGO_BIN_EXE_do-restarting"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn do-restarting");

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let log_path = log_dir().join(format!("{case}.log"));
    let log = format!(
        "args: {args:?}\nstatus: {:?}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, log).expect("write case log");

    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Write an executable shell script printing `lines` and exiting with `code`.
pub fn fake_inspector(dir: &Path, lines: &[&str], code: i32) -> PathBuf {
    let path = dir.join("fake-needs-restarting");
    let mut body = String::from("#!/bin/sh\n");
    for line in lines {
        body.push_str(&format!("echo '{line}'\n"));
    }
    body.push_str(&format!("exit {code}\n"));
    fs::write(&path, body).expect("write fake inspector");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake inspector");
    path
}

/// Write a config file into `dir` and return its path.
pub fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("do-restarting.conf");
    fs::write(&path, contents).expect("write config");
    path
}
