//! Headless presenter driven by a deterministic simulated participant.
//!
//! Nothing sleeps: waits advance a virtual clock. Every call is appended to a
//! trace so two runs of the same seed can be compared byte-for-byte.

use std::time::Duration;

use sha2::{Digest, Sha256};

use super::{
    AbortToken, BoxLayout, BoxScene, EvidenceFrame, Flow, Notice, Presentation, RatingPrompt,
};
use crate::design::factors::{BoxColor, BoxSide, DisplayMode};
use crate::design::ratio::BiasRatio;

/// How the simulated participant answers rating prompts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingPolicy {
    /// Posterior of the right-hand box under the shown ratio, rounded to the
    /// slider's 1% resolution.
    IdealObserver,
    /// Always the same rating.
    Fixed(f64),
}

/// One recorded presentation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedCall {
    Boxes {
        ratio: BiasRatio,
        layout: BoxLayout,
        highlighted: Option<BoxSide>,
    },
    Evidence {
        step: usize,
        display: DisplayMode,
        beads: Vec<BoxColor>,
    },
    Rating {
        position: usize,
        value: f64,
    },
    Choice(BoxSide),
    Notice(Notice),
    Acknowledged,
    Clear,
    Wait(Duration),
    Aborted,
}

/// Scripted [`Presentation`] used by tests and `beads simulate`.
#[derive(Debug)]
pub struct ScriptedPresentation {
    token: AbortToken,
    policy: RatingPolicy,
    abort_after_ratings: Option<usize>,
    ratings_committed: usize,
    ratio: Option<BiasRatio>,
    evidence: Vec<BoxColor>,
    clock: Duration,
    trace: Vec<ScriptedCall>,
}

impl ScriptedPresentation {
    #[must_use]
    pub const fn new(token: AbortToken) -> Self {
        Self {
            token,
            policy: RatingPolicy::IdealObserver,
            abort_after_ratings: None,
            ratings_committed: 0,
            ratio: None,
            evidence: Vec::new(),
            clock: Duration::ZERO,
            trace: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: RatingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Trigger the abort token instead of answering rating number `n + 1`.
    #[must_use]
    pub const fn with_abort_after(mut self, ratings: usize) -> Self {
        self.abort_after_ratings = Some(ratings);
        self
    }

    #[must_use]
    pub fn trace(&self) -> &[ScriptedCall] {
        &self.trace
    }

    /// Total time the session would have spent waiting.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.clock
    }

    #[must_use]
    pub const fn ratings_committed(&self) -> usize {
        self.ratings_committed
    }

    /// SHA-256 over the debug rendering of every recorded call.
    #[must_use]
    pub fn trace_digest(&self) -> String {
        let mut hasher = Sha256::new();
        for call in &self.trace {
            hasher.update(format!("{call:?}\n").as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    fn abort(&mut self) -> Flow<()> {
        self.token.trigger();
        self.trace.push(ScriptedCall::Aborted);
        self.token.check()
    }

    fn answer(&self) -> f64 {
        match self.policy {
            RatingPolicy::Fixed(value) => value.clamp(0.0, 1.0),
            RatingPolicy::IdealObserver => {
                let posterior = self
                    .ratio
                    .map_or(0.5, |ratio| right_box_posterior(ratio, &self.evidence));
                (posterior * 100.0).round() / 100.0
            }
        }
    }
}

/// Posterior that the right-hand (blue) box is the source, from a flat prior.
#[must_use]
pub fn right_box_posterior(ratio: BiasRatio, beads: &[BoxColor]) -> f64 {
    let p = ratio.majority_probability();
    let blue = beads.iter().filter(|c| **c == BoxColor::Blue).count();
    let green = beads.len() - blue;
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let exponent = blue as i32 - green as i32;
    let odds = (p / (1.0 - p)).powi(exponent);
    odds / (1.0 + odds)
}

impl Presentation for ScriptedPresentation {
    fn render_boxes(&mut self, scene: &BoxScene) -> Flow<()> {
        self.token.check()?;
        if self.ratio != Some(scene.ratio) || scene.layout == BoxLayout::Together {
            self.evidence.clear();
        }
        self.ratio = Some(scene.ratio);
        let highlighted = scene.boxes.iter().find(|b| b.highlighted).map(|b| b.side);
        self.trace.push(ScriptedCall::Boxes {
            ratio: scene.ratio,
            layout: scene.layout,
            highlighted,
        });
        Ok(())
    }

    fn render_evidence_step(&mut self, frame: &EvidenceFrame) -> Flow<()> {
        self.token.check()?;
        self.evidence.clone_from(&frame.beads);
        self.trace.push(ScriptedCall::Evidence {
            step: frame.step,
            display: frame.display,
            beads: frame.beads.clone(),
        });
        Ok(())
    }

    fn collect_continuous_rating(&mut self, prompt: RatingPrompt) -> Flow<f64> {
        self.token.check()?;
        if self.abort_after_ratings == Some(self.ratings_committed) {
            self.abort()?;
        }
        let value = self.answer();
        self.ratings_committed += 1;
        self.trace.push(ScriptedCall::Rating {
            position: prompt.position(),
            value,
        });
        Ok(value)
    }

    fn collect_discrete_choice(&mut self) -> Flow<BoxSide> {
        self.token.check()?;
        let posterior = self
            .ratio
            .map_or(0.5, |ratio| right_box_posterior(ratio, &self.evidence));
        let side = if posterior > 0.5 {
            BoxSide::Right
        } else if posterior < 0.5 {
            BoxSide::Left
        } else {
            self.evidence.last().map_or(BoxSide::Left, |c| c.side())
        };
        self.trace.push(ScriptedCall::Choice(side));
        Ok(side)
    }

    fn show_notice(&mut self, notice: &Notice) -> Flow<()> {
        self.token.check()?;
        self.trace.push(ScriptedCall::Notice(notice.clone()));
        Ok(())
    }

    fn await_acknowledgement(&mut self) -> Flow<()> {
        self.token.check()?;
        self.trace.push(ScriptedCall::Acknowledged);
        Ok(())
    }

    fn clear(&mut self) -> Flow<()> {
        self.token.check()?;
        self.trace.push(ScriptedCall::Clear);
        Ok(())
    }

    fn wait(&mut self, duration: Duration) -> Flow<()> {
        self.token.check()?;
        self.clock += duration;
        self.trace.push(ScriptedCall::Wait(duration));
        Ok(())
    }

    fn poll_abort(&mut self) -> bool {
        self.token.is_triggered()
    }
}
