//! Drives one trial through introduction, prior, eight bead steps, and the
//! final choice.
//!
//! The order is strict. Each estimate is committed to the [`Trial`] before
//! the next bead is revealed, and nothing already committed can be revised.
//! An abort from any phase discards the trial.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

use super::record::Trial;
use crate::core::config::TimingConfig;
use crate::core::errors::BeadsError;
use crate::design::bank::BEADS_PER_SEQUENCE;
use crate::logger::{EventSink, SessionEvent};
use crate::present::{
    Aborted, BoxLayout, BoxScene, EvidenceFrame, Presentation, RatingPrompt,
};

/// Whether a trial's data reaches the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialKind {
    Practice,
    Main,
}

/// Position in the per-trial state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
pub enum TrialPhase {
    BoxIntroduction,
    PriorElicitation,
    /// 1-based bead index.
    BeadStep(usize),
    FinalChoice,
    Committed,
    Aborted,
}

impl TrialPhase {
    /// Successor on the normal path; terminal phases map to themselves.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::BoxIntroduction => Self::PriorElicitation,
            Self::PriorElicitation => Self::BeadStep(1),
            Self::BeadStep(n) if n < BEADS_PER_SEQUENCE => Self::BeadStep(n + 1),
            Self::BeadStep(_) => Self::FinalChoice,
            Self::FinalChoice | Self::Committed => Self::Committed,
            Self::Aborted => Self::Aborted,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoxIntroduction => f.write_str("box introduction"),
            Self::PriorElicitation => f.write_str("prior elicitation"),
            Self::BeadStep(n) => write!(f, "bead step {n}"),
            Self::FinalChoice => f.write_str("final choice"),
            Self::Committed => f.write_str("committed"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// Why a run stopped early.
#[derive(Debug)]
pub enum Halt {
    /// The abort token fired.
    Aborted,
    /// A bookkeeping invariant was violated.
    Failed(BeadsError),
}

impl From<Aborted> for Halt {
    fn from(_: Aborted) -> Self {
        Self::Aborted
    }
}

impl From<BeadsError> for Halt {
    fn from(err: BeadsError) -> Self {
        Self::Failed(err)
    }
}

/// Result of one trial run.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    /// Every estimate and the choice were recorded.
    Committed(Trial),
    /// Aborted in `phase`; the partial trial is gone.
    Aborted { phase: TrialPhase },
}

/// Runs trials against a presenter, logging each commit.
pub struct TrialRunner<'a> {
    presenter: &'a mut dyn Presentation,
    sink: &'a mut dyn EventSink,
    timing: &'a TimingConfig,
    phase: TrialPhase,
}

impl<'a> TrialRunner<'a> {
    pub fn new(
        presenter: &'a mut dyn Presentation,
        sink: &'a mut dyn EventSink,
        timing: &'a TimingConfig,
    ) -> Self {
        Self {
            presenter,
            sink,
            timing,
            phase: TrialPhase::BoxIntroduction,
        }
    }

    /// Phase the last run reached.
    #[must_use]
    pub const fn phase(&self) -> TrialPhase {
        self.phase
    }

    /// Run `trial` to completion or abort.
    ///
    /// `index` is the 1-based position within its list, used for logging.
    /// The trial is consumed; only a completed copy comes back.
    ///
    /// # Errors
    /// Returns `TrialState` if the record rejects a mutation, which means the
    /// state machine and the record disagree.
    pub fn run(
        &mut self,
        trial: Trial,
        kind: TrialKind,
        index: usize,
    ) -> crate::core::errors::Result<TrialOutcome> {
        self.phase = TrialPhase::BoxIntroduction;
        self.sink.record(&SessionEvent::TrialStarted {
            kind,
            index,
            ratio: trial.ratio(),
            display: trial.display(),
            hidden_color: trial.hidden_color(),
        });
        match self.drive(trial, kind, index) {
            Ok(done) => {
                self.phase = TrialPhase::Committed;
                Ok(TrialOutcome::Committed(done))
            }
            Err(Halt::Aborted) => {
                let phase = self.phase;
                self.phase = TrialPhase::Aborted;
                Ok(TrialOutcome::Aborted { phase })
            }
            Err(Halt::Failed(err)) => {
                self.phase = TrialPhase::Aborted;
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<(), Halt> {
        if self.presenter.poll_abort() {
            return Err(Halt::Aborted);
        }
        self.phase = self.phase.next();
        Ok(())
    }

    fn drive(&mut self, mut trial: Trial, kind: TrialKind, index: usize) -> Result<Trial, Halt> {
        let scene = BoxScene::new(trial.ratio(), trial.hidden_color(), BoxLayout::Together);

        // BoxIntroduction
        self.presenter.render_boxes(&scene)?;
        self.presenter.wait(TimingConfig::span(self.timing.intro_dwell))?;
        self.presenter.clear()?;
        self.presenter.wait(TimingConfig::span(self.timing.layout_transition))?;
        let scene = scene.with_layout(BoxLayout::Apart);
        self.presenter.render_boxes(&scene)?;
        self.advance()?;

        // PriorElicitation
        self.elicit(&mut trial, RatingPrompt::Prior, kind, index)?;
        self.advance()?;

        // BeadStep(1..=8)
        let sequence = *trial.sequence();
        for step in 1..=sequence.len() {
            let frame = EvidenceFrame::new(
                step,
                sequence.prefix(step),
                trial.hidden_color(),
                trial.display(),
            );
            self.presenter.render_evidence_step(&frame)?;
            self.presenter.wait(TimingConfig::span(self.timing.bead_reveal))?;
            self.presenter.wait(TimingConfig::span(self.timing.bead_hold))?;
            self.elicit(&mut trial, RatingPrompt::AfterBead(step), kind, index)?;
            self.advance()?;
        }

        // FinalChoice
        let side = self.presenter.collect_discrete_choice()?;
        let choice = side.color();
        trial.record_choice(choice)?;
        self.sink.record(&SessionEvent::ChoiceCommitted {
            kind,
            index,
            choice,
            accurate: choice == trial.hidden_color(),
        });
        self.presenter.render_boxes(&scene.with_highlight(side))?;
        self.presenter.wait(TimingConfig::span(self.timing.choice_feedback))?;
        self.presenter.clear()?;
        Ok(trial)
    }

    fn elicit(
        &mut self,
        trial: &mut Trial,
        prompt: RatingPrompt,
        kind: TrialKind,
        index: usize,
    ) -> Result<(), Halt> {
        let value = self.presenter.collect_continuous_rating(prompt)?;
        let position = trial.record_estimate(value)?;
        debug_assert_eq!(position, prompt.position());
        self.sink.record(&SessionEvent::EstimateCommitted {
            kind,
            index,
            position,
            value,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::bank::BeadSequence;
    use crate::design::factors::{BoxColor, BoxSide, DisplayMode};
    use crate::design::ratio::BiasRatio;
    use crate::present::AbortToken;
    use crate::present::scripted::{RatingPolicy, ScriptedCall, ScriptedPresentation};

    fn trial() -> Trial {
        Trial::new(
            BoxColor::Blue,
            DisplayMode::Numeric,
            BiasRatio::Ninety,
            BeadSequence::from_bits([1, 1, 0, 1, 1, 1, 1, 1]),
        )
    }

    #[test]
    fn phases_advance_in_strict_order() {
        let mut phase = TrialPhase::BoxIntroduction;
        let mut seen = vec![phase];
        while !phase.is_terminal() {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(seen.len(), 12);
        assert_eq!(seen[1], TrialPhase::PriorElicitation);
        assert_eq!(seen[2], TrialPhase::BeadStep(1));
        assert_eq!(seen[9], TrialPhase::BeadStep(8));
        assert_eq!(seen[10], TrialPhase::FinalChoice);
        assert_eq!(seen[11], TrialPhase::Committed);
        assert_eq!(TrialPhase::Aborted.next(), TrialPhase::Aborted);
    }

    #[test]
    fn completed_run_records_nine_estimates_and_choice() {
        let mut presenter = ScriptedPresentation::new(AbortToken::new());
        let mut sink: Vec<SessionEvent> = Vec::new();
        let timing = TimingConfig::default();
        let outcome = TrialRunner::new(&mut presenter, &mut sink, &timing)
            .run(trial(), TrialKind::Main, 1)
            .unwrap();

        let TrialOutcome::Committed(done) = outcome else {
            panic!("expected a committed trial");
        };
        assert!(done.is_complete());
        assert_eq!(done.prob_estimates().len(), 9);
        assert!((done.prob_estimates()[0] - 0.5).abs() < 1e-12);
        assert_eq!(done.final_choice(), Some(BoxColor::Blue));
        assert_eq!(done.is_accurate(), Some(true));

        let estimates = sink
            .iter()
            .filter(|e| e.name() == "estimate_committed")
            .count();
        assert_eq!(estimates, 9);
        assert_eq!(sink.first().map(SessionEvent::name), Some("trial_started"));
        assert_eq!(sink.last().map(SessionEvent::name), Some("choice_committed"));
    }

    #[test]
    fn prior_is_collected_before_any_bead() {
        let mut presenter = ScriptedPresentation::new(AbortToken::new());
        let timing = TimingConfig::default();
        TrialRunner::new(&mut presenter, &mut crate::logger::NullLogger, &timing)
            .run(trial(), TrialKind::Practice, 1)
            .unwrap();

        let trace = presenter.trace();
        let prior = trace
            .iter()
            .position(|c| matches!(c, ScriptedCall::Rating { position: 0, .. }))
            .unwrap();
        let first_bead = trace
            .iter()
            .position(|c| matches!(c, ScriptedCall::Evidence { .. }))
            .unwrap();
        assert!(prior < first_bead);
        let highlighted = trace.iter().any(|c| {
            matches!(
                c,
                ScriptedCall::Boxes {
                    highlighted: Some(BoxSide::Right),
                    ..
                }
            )
        });
        assert!(highlighted);
    }

    #[test]
    fn intro_timing_is_honoured() {
        let mut presenter = ScriptedPresentation::new(AbortToken::new());
        let timing = TimingConfig::default();
        TrialRunner::new(&mut presenter, &mut crate::logger::NullLogger, &timing)
            .run(trial(), TrialKind::Main, 1)
            .unwrap();
        // 3.0 + 0.5 + 8 × (0.8 + 0.3) + 0.3
        let expected = TimingConfig::span(3.0 + 0.5 + 8.0 * 1.1 + 0.3);
        let diff = presenter.elapsed().abs_diff(expected);
        assert!(diff < std::time::Duration::from_millis(1), "{diff:?}");
    }

    #[test]
    fn abort_during_bead_three_discards_trial() {
        // Prior + beads 1 and 2 answered, abort on the bead-3 rating.
        let mut presenter = ScriptedPresentation::new(AbortToken::new())
            .with_policy(RatingPolicy::Fixed(0.7))
            .with_abort_after(3);
        let mut sink: Vec<SessionEvent> = Vec::new();
        let timing = TimingConfig::instant();
        let mut runner = TrialRunner::new(&mut presenter, &mut sink, &timing);
        let outcome = runner.run(trial(), TrialKind::Main, 4).unwrap();
        assert_eq!(
            outcome,
            TrialOutcome::Aborted {
                phase: TrialPhase::BeadStep(3)
            }
        );
        assert_eq!(runner.phase(), TrialPhase::Aborted);
        assert!(!sink.iter().any(|e| e.name() == "choice_committed"));
    }

    #[test]
    fn pre_triggered_token_aborts_in_introduction() {
        let token = AbortToken::new();
        token.trigger();
        let mut presenter = ScriptedPresentation::new(token);
        let timing = TimingConfig::instant();
        let outcome = TrialRunner::new(&mut presenter, &mut crate::logger::NullLogger, &timing)
            .run(trial(), TrialKind::Main, 1)
            .unwrap();
        assert_eq!(
            outcome,
            TrialOutcome::Aborted {
                phase: TrialPhase::BoxIntroduction
            }
        );
    }
}
