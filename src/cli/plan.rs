//! `beads plan`: the generated trial plan, without running a session.

#![allow(missing_docs)]

use std::fmt::Write as _;
use std::io::{self, Write as _};

use colored::Colorize;
use serde::Serialize;

use crate::cli_app::stdout_error;
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::design::bank::SequenceBank;
use crate::design::factors::{BoxColor, DisplayMode};
use crate::design::ratio::BiasRatio;
use crate::present::RestKind;
use crate::session::scheduler::BlockScheduler;
use crate::session::{Session, SubjectId};
use crate::trial::Trial;

/// Placeholder subject; plans are never exported.
const PLAN_SUBJECT: &str = "plan";

#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub seed: u64,
    pub fingerprint: String,
    pub main_trials: usize,
    pub practice: Vec<PlannedTrial>,
    pub blocks: Vec<PlannedBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedBlock {
    pub number: usize,
    pub display: DisplayMode,
    pub ratio: BiasRatio,
    pub trials: Vec<PlannedTrial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_after: Option<RestKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedTrial {
    /// 1-based, counted across the main list (or the practice list).
    pub index: usize,
    pub display: DisplayMode,
    pub ratio: BiasRatio,
    pub hidden_color: BoxColor,
    pub sequence: String,
    pub majority_beads: usize,
    pub evidence_asymmetry: f64,
}

impl PlannedTrial {
    fn from_trial(index: usize, trial: &Trial) -> Self {
        Self {
            index,
            display: trial.display(),
            ratio: trial.ratio(),
            hidden_color: trial.hidden_color(),
            sequence: trial.sequence().to_delimited(),
            majority_beads: trial.sequence().majority_count(),
            evidence_asymmetry: trial.evidence_asymmetry(),
        }
    }
}

/// Generate the session's trial lists and lay them out in blocks.
pub fn build_plan(config: &Config) -> Result<PlanReport> {
    let subject = SubjectId::parse(PLAN_SUBJECT)?;
    let session = Session::new(subject, &config.design, &SequenceBank::reference())?;
    let main = session.main_trials();
    let scheduler = BlockScheduler::new(main, config.design.trials_per_block);

    let blocks = scheduler
        .blocks()
        .iter()
        .map(|block| PlannedBlock {
            number: block.number,
            display: block.display,
            ratio: block.ratio,
            trials: block
                .trials
                .clone()
                .map(|i| PlannedTrial::from_trial(i + 1, &main[i]))
                .collect(),
            rest_after: scheduler.rest_after(block.number),
        })
        .collect();

    Ok(PlanReport {
        seed: session.seed(),
        fingerprint: session.fingerprint().to_string(),
        main_trials: main.len(),
        practice: session
            .practice_trials()
            .iter()
            .enumerate()
            .map(|(i, trial)| PlannedTrial::from_trial(i + 1, trial))
            .collect(),
        blocks,
    })
}

/// Render a plan for the terminal.
#[must_use]
pub fn format_plan(report: &PlanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Beads task plan".bold());
    let _ = writeln!(out, "  seed         {}", report.seed);
    let _ = writeln!(out, "  fingerprint  {}", report.fingerprint);
    let _ = writeln!(
        out,
        "  main trials  {} in {} blocks",
        report.main_trials,
        report.blocks.len()
    );
    let _ = writeln!(out, "  practice     {} trials", report.practice.len());

    if !report.practice.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "[practice]".cyan());
        for trial in &report.practice {
            write_trial(&mut out, trial);
        }
    }

    for block in &report.blocks {
        let _ = writeln!(out);
        let header = format!(
            "[block {}] {} {}/{} ({} trials)",
            block.number,
            block.display,
            block.ratio.majority_percent(),
            block.ratio.minority_percent(),
            block.trials.len()
        );
        let _ = writeln!(out, "{}", header.cyan());
        for trial in &block.trials {
            write_trial(&mut out, trial);
        }
        match block.rest_after {
            Some(RestKind::Regular) => {
                let _ = writeln!(out, "  -> rest");
            }
            Some(RestKind::DisplaySwitch) => {
                let _ = writeln!(out, "  -> rest, display switch");
            }
            None => {}
        }
    }
    out
}

fn write_trial(out: &mut String, trial: &PlannedTrial) {
    let _ = writeln!(
        out,
        "  {:>3}  {:<7} {:<5} {}  majority {}  asymmetry {:.3}",
        trial.index,
        trial.display.as_str(),
        trial.hidden_color.as_str(),
        trial.sequence,
        trial.majority_beads,
        trial.evidence_asymmetry
    );
}

/// Print the plan as text or JSON.
pub fn execute(config: &Config, json: bool) -> Result<()> {
    let report = build_plan(config)?;
    let text = if json {
        let mut doc = serde_json::to_string_pretty(&report)?;
        doc.push('\n');
        doc
    } else {
        format_plan(&report)
    };
    io::stdout().write_all(text.as_bytes()).map_err(stdout_error)
}
