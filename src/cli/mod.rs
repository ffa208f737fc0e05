//! Subcommand implementations behind the `beads` binary.

#![allow(missing_docs)]

pub mod plan;
pub mod run;
pub mod simulate;

use std::fmt::Write as _;

use colored::Colorize;

use crate::session::{SessionReport, SessionStatus};

/// Human summary printed after a session, interactive or simulated.
#[must_use]
pub fn format_session_summary(report: &SessionReport) -> String {
    let mut out = String::new();
    match report.status {
        SessionStatus::Completed => {
            let _ = writeln!(
                out,
                "{} subject {}",
                "Session complete:".green().bold(),
                report.subject
            );
        }
        SessionStatus::Aborted { stage, phase } => {
            let place = phase.map_or_else(
                || stage.as_str().to_string(),
                |phase| format!("{} ({phase})", stage.as_str()),
            );
            let _ = writeln!(
                out,
                "{} subject {} during {place}",
                "Session aborted:".yellow().bold(),
                report.subject
            );
        }
    }
    let _ = writeln!(out, "  seed         {}", report.seed);
    let _ = writeln!(
        out,
        "  results      {} ({} trials, {} rows)",
        report.flush.path.display(),
        report.flush.trials,
        report.flush.rows
    );
    if report.dropped_events > 0 {
        let _ = writeln!(
            out,
            "  {} {} event log entries could not be written",
            "warning:".yellow(),
            report.dropped_events
        );
    }
    out
}
