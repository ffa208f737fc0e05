//! Session ownership and the end-to-end experiment script.
//!
//! A [`Session`] owns the subject identifier, both trial lists, and the
//! append-only results. Only main trials that reached the committed phase
//! are appended. Results are flushed exactly once, on completion or abort.

#![allow(missing_docs)]

pub mod scheduler;
#[cfg(feature = "signals")]
pub mod signals;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::Serialize;

use self::scheduler::BlockScheduler;
use crate::core::config::{Config, DesignConfig, TimingConfig};
use crate::core::errors::{BeadsError, Result};
use crate::design::bank::SequenceBank;
use crate::design::factory::{TrialFactory, design_fingerprint, distinct_in_order};
use crate::export::{export, write_results_file};
use crate::logger::{EventSink, SessionEvent};
use crate::present::{Notice, Presentation, RestKind};
use crate::trial::record::Trial;
use crate::trial::runner::{Halt, TrialKind, TrialOutcome, TrialPhase, TrialRunner};

// ──────────────────── subject ────────────────────

const SUBJECT_MAX_LEN: usize = 64;

fn subject_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*$").ok())
        .as_ref()
}

/// Participant identifier, safe to embed in a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Trim and validate: 1 to 64 of `[A-Za-z0-9._-]`, not starting with `.`.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let reject = |reason: &str| BeadsError::InvalidSubject {
            subject: raw.to_string(),
            reason: reason.to_string(),
        };
        if trimmed.is_empty() {
            return Err(reject("must not be empty"));
        }
        if trimmed.chars().count() > SUBJECT_MAX_LEN {
            return Err(reject("longer than 64 characters"));
        }
        let pattern = subject_pattern().ok_or_else(|| reject("validation pattern unavailable"))?;
        if !pattern.is_match(trimmed) {
            return Err(reject(
                "only letters, digits, '.', '_' and '-' are allowed, and it must not start with '.'",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ──────────────────── session state ────────────────────

/// Coarse position in the experiment script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Setup,
    Instructions,
    Practice,
    Main,
    Rest,
    Export,
    Farewell,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Instructions => "instructions",
            Self::Practice => "practice",
            Self::Main => "main",
            Self::Rest => "rest",
            Self::Export => "export",
            Self::Farewell => "farewell",
        }
    }
}

/// Where a flush went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushSummary {
    pub path: PathBuf,
    pub trials: usize,
    pub rows: usize,
}

#[derive(Debug)]
pub struct Session {
    subject: SubjectId,
    seed: u64,
    fingerprint: String,
    practice: Vec<Trial>,
    main: Vec<Trial>,
    results: Vec<Trial>,
    flushed_to: Option<PathBuf>,
    stage: Stage,
}

impl Session {
    /// Generate both trial lists. Fails before any trial exists if the
    /// design is malformed.
    pub fn new(subject: SubjectId, design: &DesignConfig, bank: &SequenceBank) -> Result<Self> {
        let seed = design.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let factory = TrialFactory::new(bank);
        let main =
            factory.generate_main_trials(&design.display_order, &design.block_order, &mut rng)?;
        let practice = if design.practice {
            factory.generate_practice_trials(
                &design.display_order,
                &distinct_in_order(&design.block_order),
                &mut rng,
            )?
        } else {
            Vec::new()
        };
        Ok(Self {
            subject,
            seed,
            fingerprint: design_fingerprint(bank, &design.block_order, &design.display_order),
            practice,
            main,
            results: Vec::new(),
            flushed_to: None,
            stage: Stage::Setup,
        })
    }

    #[must_use]
    pub const fn subject(&self) -> &SubjectId {
        &self.subject
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub fn practice_trials(&self) -> &[Trial] {
        &self.practice
    }

    #[must_use]
    pub fn main_trials(&self) -> &[Trial] {
        &self.main
    }

    /// Committed main trials, in completion order.
    #[must_use]
    pub fn results(&self) -> &[Trial] {
        &self.results
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn is_flushed(&self) -> bool {
        self.flushed_to.is_some()
    }

    /// Append a completed main trial; returns its 1-based result index.
    pub fn commit(&mut self, trial: Trial) -> Result<usize> {
        if let Some(path) = &self.flushed_to {
            return Err(BeadsError::AlreadyFlushed { path: path.clone() });
        }
        if !trial.is_complete() {
            return Err(BeadsError::trial_state(format!(
                "cannot commit an incomplete trial ({} of {} estimates, choice {})",
                trial.prob_estimates().len(),
                trial.expected_estimates(),
                if trial.final_choice().is_some() { "set" } else { "unset" },
            )));
        }
        self.results.push(trial);
        Ok(self.results.len())
    }

    /// Export the results to `path`. A second call fails.
    pub fn flush(&mut self, path: &Path) -> Result<FlushSummary> {
        if let Some(previous) = &self.flushed_to {
            return Err(BeadsError::AlreadyFlushed {
                path: previous.clone(),
            });
        }
        self.flushed_to = Some(path.to_path_buf());
        let rows = export(&self.results, self.subject.as_str());
        let written = write_results_file(path, &rows)?;
        Ok(FlushSummary {
            path: path.to_path_buf(),
            trials: self.results.len(),
            rows: written,
        })
    }
}

// ──────────────────── script ────────────────────

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Completed,
    Aborted {
        stage: Stage,
        phase: Option<TrialPhase>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub subject: SubjectId,
    pub seed: u64,
    pub status: SessionStatus,
    pub flush: FlushSummary,
    pub dropped_events: u64,
}

/// Run the full script: instructions, practice, main blocks with rests,
/// export, farewell.
///
/// An abort at any suspension point still flushes the committed results and
/// returns `Ok` with an `Aborted` status.
///
/// # Errors
/// Returns an error if results cannot be written or trial bookkeeping is
/// violated. Committed results are flushed before a bookkeeping error is
/// returned.
pub fn run_session(
    session: &mut Session,
    presenter: &mut dyn Presentation,
    sink: &mut dyn EventSink,
    config: &Config,
) -> Result<SessionReport> {
    sink.record(&SessionEvent::SessionStarted {
        subject: session.subject.to_string(),
        seed: session.seed,
        fingerprint: session.fingerprint.clone(),
        main_trials: session.main.len(),
        practice_trials: session.practice.len(),
    });

    let mut aborted_phase = None;
    let outcome = run_script(session, presenter, sink, config, &mut aborted_phase);
    let path = config.paths.results_path(session.subject.as_str());

    let status = match outcome {
        Ok(()) => SessionStatus::Completed,
        Err(Halt::Aborted) => {
            let status = SessionStatus::Aborted {
                stage: session.stage,
                phase: aborted_phase,
            };
            sink.record(&SessionEvent::SessionAborted {
                stage: session.stage,
                phase: aborted_phase,
                committed: session.results.len(),
            });
            status
        }
        Err(Halt::Failed(err)) => {
            if let Err(flush_err) = flush_logged(session, sink, &path) {
                sink.record(&SessionEvent::ResultsFlushFailed {
                    path,
                    error: flush_err.to_string(),
                });
            }
            return Err(err);
        }
    };

    session.stage = Stage::Export;
    let flush = match flush_logged(session, sink, &path) {
        Ok(summary) => summary,
        Err(err) => {
            sink.record(&SessionEvent::ResultsFlushFailed {
                path,
                error: err.to_string(),
            });
            return Err(err);
        }
    };

    if status == SessionStatus::Completed {
        session.stage = Stage::Farewell;
        sink.record(&SessionEvent::SessionCompleted {
            committed: session.results.len(),
        });
        // Results are already on disk; an abort here only cuts the goodbye short.
        if presenter.show_notice(&Notice::Farewell).is_ok() {
            let _ = presenter.wait(TimingConfig::span(config.timing.farewell));
        }
    }
    let _ = presenter.clear();

    Ok(SessionReport {
        subject: session.subject.clone(),
        seed: session.seed,
        status,
        flush,
        dropped_events: sink.dropped(),
    })
}

fn flush_logged(
    session: &mut Session,
    sink: &mut dyn EventSink,
    path: &Path,
) -> Result<FlushSummary> {
    let summary = session.flush(path)?;
    sink.record(&SessionEvent::ResultsFlushed {
        path: summary.path.clone(),
        rows: summary.rows,
    });
    Ok(summary)
}

fn run_script(
    session: &mut Session,
    presenter: &mut dyn Presentation,
    sink: &mut dyn EventSink,
    config: &Config,
    aborted_phase: &mut Option<TrialPhase>,
) -> std::result::Result<(), Halt> {
    let timing = &config.timing;
    let mut scheduler = BlockScheduler::new(&session.main, config.design.trials_per_block);

    session.stage = Stage::Instructions;
    show_and_acknowledge(presenter, &Notice::Instructions)?;
    let displays = config.design.display_order.len().max(1);
    show_and_acknowledge(
        presenter,
        &Notice::BlockOverview {
            blocks: displays,
            trials_per_display: session.main.len() / displays,
            practice_trials: session.practice.len(),
            first_display: config
                .design
                .display_order
                .first()
                .copied()
                .unwrap_or(crate::design::factors::DisplayMode::Visual),
        },
    )?;

    if !session.practice.is_empty() {
        session.stage = Stage::Practice;
        presenter.show_notice(&Notice::PracticeBanner)?;
        presenter.wait(TimingConfig::span(timing.practice_banner))?;
        presenter.clear()?;
        let practice = session.practice.clone();
        for (i, trial) in practice.into_iter().enumerate() {
            run_one(presenter, sink, timing, trial, TrialKind::Practice, i + 1, aborted_phase)?;
            presenter.wait(TimingConfig::span(timing.inter_trial))?;
        }
        presenter.clear()?;
        presenter.wait(TimingConfig::span(timing.practice_outro))?;
        show_and_acknowledge(presenter, &Notice::PracticeComplete)?;
    }

    let blocks = scheduler.blocks().to_vec();
    for block in &blocks {
        session.stage = Stage::Main;
        for index in block.trials.clone() {
            let trial = session.main[index].clone();
            if let Some(done) =
                run_one(presenter, sink, timing, trial, TrialKind::Main, index + 1, aborted_phase)?
            {
                let result_index = session.commit(done)?;
                sink.record(&SessionEvent::TrialCommitted { result_index });
            }
            presenter.wait(TimingConfig::span(timing.inter_trial))?;
        }

        if let Some(kind) = scheduler.take_rest(block.number) {
            session.stage = Stage::Rest;
            rest(presenter, sink, timing, block.number, kind)?;
        }
    }
    Ok(())
}

/// Run one trial; `Ok(Some(_))` for a completed main trial.
fn run_one(
    presenter: &mut dyn Presentation,
    sink: &mut dyn EventSink,
    timing: &TimingConfig,
    trial: Trial,
    kind: TrialKind,
    index: usize,
    aborted_phase: &mut Option<TrialPhase>,
) -> std::result::Result<Option<Trial>, Halt> {
    match TrialRunner::new(presenter, sink, timing).run(trial, kind, index)? {
        TrialOutcome::Committed(done) => Ok((kind == TrialKind::Main).then_some(done)),
        TrialOutcome::Aborted { phase } => {
            *aborted_phase = Some(phase);
            Err(Halt::Aborted)
        }
    }
}

fn rest(
    presenter: &mut dyn Presentation,
    sink: &mut dyn EventSink,
    timing: &TimingConfig,
    after_block: usize,
    kind: RestKind,
) -> std::result::Result<(), Halt> {
    sink.record(&SessionEvent::RestStarted {
        after_block,
        kind,
        seconds: timing.rest,
    });
    presenter.show_notice(&Notice::Rest {
        kind,
        seconds: whole_seconds(timing.rest),
    })?;
    presenter.wait(TimingConfig::span(timing.rest))?;
    presenter.show_notice(&Notice::GetReady)?;
    presenter.wait(TimingConfig::span(timing.get_ready))?;
    presenter.clear()?;
    Ok(())
}

fn show_and_acknowledge(
    presenter: &mut dyn Presentation,
    notice: &Notice,
) -> std::result::Result<(), Halt> {
    presenter.show_notice(notice)?;
    if notice.needs_acknowledgement() {
        presenter.await_acknowledgement()?;
    }
    presenter.clear()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(seconds: f64) -> u64 {
    seconds.max(0.0).round() as u64
}
