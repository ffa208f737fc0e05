//! `beads` binary entry point.

use std::process::ExitCode;

use beads_task::cli_app::{Cli, run};
use clap::Parser;
use colored::Colorize;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
