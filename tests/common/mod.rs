//! Shared harness for driving the compiled `beads` binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Captured result of one CLI invocation. Every case also leaves a log file
/// with the full argv and both streams for post-mortem inspection.
#[derive(Debug)]
pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn log_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("beads-cli-cases")
}

/// Run `beads <args>` with colour disabled and capture everything.
pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_in(case_name, args, None)
}

/// Same as [`run_cli_case`], with the working directory set to `cwd`.
pub fn run_cli_case_in(case_name: &str, args: &[&str], cwd: Option<&Path>) -> CmdResult {
    let mut command = Command::new(env!("CARGO_BIN_EXE_beads"));
    command.args(args).env("NO_COLOR", "1");
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn beads for {case_name}: {e}"));

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let dir = log_dir();
    fs::create_dir_all(&dir).expect("create case log dir");
    let log_path = dir.join(format!("{case_name}.log"));
    let log = format!(
        "case: {case_name}\nargs: {args:?}\nstatus: {}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status
    );
    fs::write(&log_path, log).expect("write case log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
