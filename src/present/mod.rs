//! Presentation-layer contract and the immutable render descriptors the core
//! hands to it.
//!
//! The core never holds on to anything drawn: every call receives a fresh
//! descriptor. Whatever a presenter caches between calls is its own business.
//!
//! Every suspension point returns [`Flow`]; an `Err(Aborted)` unwinds the
//! caller through `?` straight to the session, which flushes and exits.

#![allow(missing_docs)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::design::bank::{BEADS_PER_SEQUENCE, Bead};
use crate::design::factors::{BoxColor, BoxSide, DisplayMode};
use crate::design::ratio::BiasRatio;

pub mod scripted;

// ──────────────────── cancellation ────────────────────

/// The participant (or the OS) asked to end the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aborted;

impl fmt::Display for Aborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("session aborted")
    }
}

impl std::error::Error for Aborted {}

/// Result of any call that may suspend.
pub type Flow<T> = Result<T, Aborted>;

/// Single cancellation token shared by every suspension point.
///
/// Cloning shares the flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Aborted)` once triggered.
    pub fn check(&self) -> Flow<()> {
        if self.is_triggered() { Err(Aborted) } else { Ok(()) }
    }

    /// Underlying flag, for registration with OS signal handlers.
    #[must_use]
    pub fn shared_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

// ──────────────────── boxes ────────────────────

/// A box's role relative to the trial's hidden source.
///
/// Carried explicitly so nothing downstream has to infer which box is which
/// from how it happens to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxIdentity {
    /// Its majority colour is the hidden colour.
    Majority,
    /// The complementary box.
    Minority,
}

/// Where the two boxes sit on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxLayout {
    /// Close together, for the introduction.
    Together,
    /// Far apart, leaving room for the rating slider between them.
    Apart,
}

/// Immutable render descriptor for one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxDescriptor {
    pub side: BoxSide,
    pub color: BoxColor,
    pub identity: BoxIdentity,
    /// Beads of `color` per hundred.
    pub majority_percent: u8,
    /// Beads of the other colour per hundred.
    pub minority_percent: u8,
    pub highlighted: bool,
}

/// Both boxes with their compositions for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxScene {
    pub ratio: BiasRatio,
    pub hidden_color: BoxColor,
    pub layout: BoxLayout,
    pub boxes: [BoxDescriptor; 2],
}

impl BoxScene {
    #[must_use]
    pub fn new(ratio: BiasRatio, hidden_color: BoxColor, layout: BoxLayout) -> Self {
        let (majority_percent, minority_percent) = ratio.split();
        let boxes = BoxColor::ALL.map(|color| BoxDescriptor {
            side: color.side(),
            color,
            identity: if color == hidden_color {
                BoxIdentity::Majority
            } else {
                BoxIdentity::Minority
            },
            majority_percent,
            minority_percent,
            highlighted: false,
        });
        Self {
            ratio,
            hidden_color,
            layout,
            boxes,
        }
    }

    /// Same scene with `layout` swapped.
    #[must_use]
    pub fn with_layout(mut self, layout: BoxLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Same scene with the box on `side` highlighted.
    #[must_use]
    pub fn with_highlight(mut self, side: BoxSide) -> Self {
        for descriptor in &mut self.boxes {
            descriptor.highlighted = descriptor.side == side;
        }
        self
    }

    #[must_use]
    pub fn box_at(&self, side: BoxSide) -> &BoxDescriptor {
        match side {
            BoxSide::Left => &self.boxes[0],
            BoxSide::Right => &self.boxes[1],
        }
    }
}

// ──────────────────── evidence ────────────────────

/// Cumulative evidence after `step` reveals, already mapped to colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceFrame {
    /// 1-based index of the bead just revealed.
    pub step: usize,
    pub total: usize,
    pub beads: Vec<BoxColor>,
    pub display: DisplayMode,
}

impl EvidenceFrame {
    #[must_use]
    pub fn new(
        step: usize,
        cumulative: &[Bead],
        hidden_color: BoxColor,
        display: DisplayMode,
    ) -> Self {
        Self {
            step,
            total: BEADS_PER_SEQUENCE,
            beads: cumulative.iter().map(|b| b.color(hidden_color)).collect(),
            display,
        }
    }

    /// Colour of the bead revealed at this step.
    #[must_use]
    pub fn latest(&self) -> Option<BoxColor> {
        self.beads.last().copied()
    }

    #[must_use]
    pub fn count(&self, color: BoxColor) -> usize {
        self.beads.iter().filter(|c| **c == color).count()
    }

    /// Share of drawn beads with `color`, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self, color: BoxColor) -> f64 {
        if self.beads.is_empty() {
            return 0.0;
        }
        self.count(color) as f64 / self.beads.len() as f64 * 100.0
    }
}

// ──────────────────── prompts & notices ────────────────────

/// Which continuous rating is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingPrompt {
    /// Before any bead is shown.
    Prior,
    /// After bead `n` (1-based).
    AfterBead(usize),
}

impl RatingPrompt {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Prior => {
                "Before seeing any beads, estimate the probability of the Hidden Box using the slider"
            }
            Self::AfterBead(_) => "Estimate the probability of the Hidden Box given the bead sample",
        }
    }

    /// Bead position the rating will be stored under.
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::Prior => 0,
            Self::AfterBead(n) => n,
        }
    }
}

/// Kind of rest inserted at a block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    Regular,
    /// The next block uses the other display mode.
    DisplaySwitch,
}

/// Full-screen text shown between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Instructions,
    BlockOverview {
        blocks: usize,
        trials_per_display: usize,
        practice_trials: usize,
        first_display: DisplayMode,
    },
    PracticeBanner,
    PracticeComplete,
    Rest {
        kind: RestKind,
        seconds: u64,
    },
    GetReady,
    Farewell,
}

impl Notice {
    /// Participant-facing text.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Instructions => "In this task, beads will be drawn from one of two boxes:\n\
                 Green Box (mostly Green Beads)    Blue Box (mostly Blue Beads)\n\n\
                 One of these boxes will be chosen RANDOMLY as the Hidden Box.\n\
                 Beads will be drawn RANDOMLY from it, one at a time WITH REPLACEMENT.\n\
                 After each bead draw, you will estimate with a slider which box you think \
                 more probable to have been chosen as the Hidden Box.\n\
                 After 8 beads have been drawn, you will decide which one of the two boxes \
                 you think the sample was drawn from."
                .to_string(),
            Self::BlockOverview {
                blocks,
                trials_per_display,
                practice_trials,
                first_display,
            } => {
                let (first, second) = match first_display {
                    DisplayMode::Visual => (VISUAL_BLURB, NUMERIC_BLURB),
                    DisplayMode::Numeric => (NUMERIC_BLURB, VISUAL_BLURB),
                };
                format!(
                    "In the main experiment you will complete {blocks} blocks of \
                     {trials_per_display} trials each.\n\
                     In the first block {first}\n\
                     In the second block {second}\n\n\
                     Before beginning the main experiment, you will complete \
                     {practice_trials} practice trials, to get a grasp on the task."
                )
            }
            Self::PracticeBanner => "Practice trials".to_string(),
            Self::PracticeComplete => "You've completed the practice trials.\n\
                 Please consult the experimenter if you have any questions.\n\
                 If not, press any key to begin the main experiment."
                .to_string(),
            Self::Rest {
                kind: RestKind::Regular,
                seconds,
            } => format!(
                "{}-break.\nA notification will appear on screen when the break is over.",
                rest_label(*seconds)
            ),
            Self::Rest {
                kind: RestKind::DisplaySwitch,
                seconds,
            } => format!(
                "You've completed the first block.\n\
                 The next block will begin after a {} break.\n\
                 In each of the following trials, the display format of beads drawn will be different.\n\
                 A notification will appear on screen when the break is over.",
                rest_label(*seconds)
            ),
            Self::GetReady => "Get ready. The next block will begin in a few seconds.".to_string(),
            Self::Farewell => "Thank you :)".to_string(),
        }
    }

    /// Whether the notice stays up until the participant presses a key.
    #[must_use]
    pub const fn needs_acknowledgement(&self) -> bool {
        matches!(
            self,
            Self::Instructions | Self::BlockOverview { .. } | Self::PracticeComplete
        )
    }
}

/// `60` → `1-minute`, `45` → `45-second`.
fn rest_label(seconds: u64) -> String {
    if seconds > 0 && seconds % 60 == 0 {
        format!("{}-minute", seconds / 60)
    } else {
        format!("{seconds}-second")
    }
}

const VISUAL_BLURB: &str =
    "a visual record of beads drawn will be present, to help you keep track of the beads drawn so far.";
const NUMERIC_BLURB: &str = "instead of a visual record, you will be informed of the percentwise \
     distribution of blue and green beads drawn so far, updated as beads are drawn.";

// ──────────────────── contract ────────────────────

/// Everything the core needs from a rendering/input layer.
///
/// Blocking calls return only on a confirmed input, an elapsed duration, or
/// an abort. Presenter-side failures (terminal errors, lost input devices)
/// must surface as `Err(Aborted)`.
pub trait Presentation {
    /// Draw the two labelled boxes with their compositions.
    fn render_boxes(&mut self, scene: &BoxScene) -> Flow<()>;

    /// Draw the visual record or the percentage summary of beads so far.
    fn render_evidence_step(&mut self, frame: &EvidenceFrame) -> Flow<()>;

    /// Block until a rating in `[0, 1]` (probability of the right-hand box)
    /// is confirmed. Hover values never leave the presenter.
    fn collect_continuous_rating(&mut self, prompt: RatingPrompt) -> Flow<f64>;

    /// Block until the participant picks a box.
    fn collect_discrete_choice(&mut self) -> Flow<BoxSide>;

    /// Show a full-screen notice (does not block).
    fn show_notice(&mut self, notice: &Notice) -> Flow<()>;

    /// Block until any key.
    fn await_acknowledgement(&mut self) -> Flow<()>;

    /// Blank the screen.
    fn clear(&mut self) -> Flow<()>;

    /// Blocking timed pause.
    fn wait(&mut self, duration: Duration) -> Flow<()>;

    /// Non-blocking abort check.
    fn poll_abort(&mut self) -> bool;
}
