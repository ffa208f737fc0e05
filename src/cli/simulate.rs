//! `beads simulate`: a full session driven by a scripted participant.
//!
//! Uses the configured timings against a virtual clock, so a complete
//! session finishes instantly but reports how long it would have taken.

#![allow(missing_docs)]

use std::io::{self, Write as _};

use serde::Serialize;

use super::format_session_summary;
use crate::cli_app::{SimulateArgs, stdout_error};
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::design::bank::SequenceBank;
use crate::logger::JsonlLogger;
use crate::present::AbortToken;
use crate::present::scripted::{RatingPolicy, ScriptedPresentation};
use crate::session::{Session, SessionReport, SubjectId, run_session};

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    #[serde(flatten)]
    pub session: SessionReport,
    pub ratings_committed: usize,
    /// Wall-clock length the session would have had with a real participant.
    pub virtual_seconds: f64,
    pub trace_digest: String,
}

/// Run a scripted session and export its results.
pub fn simulate(config: &Config, args: &SimulateArgs) -> Result<SimulationReport> {
    let subject = SubjectId::parse(&args.subject)?;
    let mut session = Session::new(subject, &config.design, &SequenceBank::reference())?;

    let policy = args
        .fixed_rating
        .map_or(RatingPolicy::IdealObserver, RatingPolicy::Fixed);
    let mut presenter = ScriptedPresentation::new(AbortToken::new()).with_policy(policy);
    if let Some(ratings) = args.abort_after {
        presenter = presenter.with_abort_after(ratings);
    }
    let mut logger = JsonlLogger::open(&config.paths.event_log_path(session.subject().as_str()));

    let report = run_session(&mut session, &mut presenter, &mut logger, config)?;
    Ok(SimulationReport {
        session: report,
        ratings_committed: presenter.ratings_committed(),
        virtual_seconds: presenter.elapsed().as_secs_f64(),
        trace_digest: presenter.trace_digest(),
    })
}

pub fn execute(config: &Config, args: &SimulateArgs) -> Result<()> {
    let report = simulate(config, args)?;
    let text = if args.json {
        let mut doc = serde_json::to_string_pretty(&report)?;
        doc.push('\n');
        doc
    } else {
        format!(
            "{}  ratings      {}\n  virtual time {:.1} s\n  trace digest {}\n",
            format_session_summary(&report.session),
            report.ratings_committed,
            report.virtual_seconds,
            report.trace_digest
        )
    };
    io::stdout().write_all(text.as_bytes()).map_err(stdout_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStatus;

    fn args(abort_after: Option<usize>) -> SimulateArgs {
        SimulateArgs {
            subject: "SIM".to_string(),
            abort_after,
            fixed_rating: None,
            json: false,
            design: crate::cli_app::DesignOverrides::default(),
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.design.seed = Some(21);
        config.paths.output_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn full_simulation_writes_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let report = simulate(&config_in(dir.path()), &args(None)).unwrap();
        assert_eq!(report.session.status, SessionStatus::Completed);
        assert_eq!(report.session.flush.rows, 64 * 9);
        assert_eq!(report.ratings_committed, (64 + 4) * 9);
        assert!(report.virtual_seconds > 60.0 * 7.0);
        assert!(dir.path().join("beads_task_results_SIM.csv").exists());
        assert!(dir.path().join("beads_task_events_SIM.jsonl").exists());
    }

    #[test]
    fn aborted_simulation_still_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let report = simulate(&config_in(dir.path()), &args(Some(4 * 9 + 2))).unwrap();
        assert!(matches!(report.session.status, SessionStatus::Aborted { .. }));
        assert_eq!(report.session.flush.rows, 0);
        assert!(dir.path().join("beads_task_results_SIM.csv").exists());
    }

    #[test]
    fn json_report_flattens_session_fields() {
        let dir = tempfile::tempdir().unwrap();
        let report = simulate(&config_in(dir.path()), &args(None)).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["subject"], "SIM");
        assert_eq!(value["status"]["status"], "completed");
        assert_eq!(value["trace_digest"].as_str().unwrap().len(), 64);
    }
}
