//! Elm-style screen model for the terminal presenter.
//!
//! All display state lives in [`BeadsModel`]. Core calls and key presses
//! arrive as [`BeadsMsg`] values; anything that must leave the model (a
//! committed rating, an abort) comes back as a [`BeadsCmd`] from
//! [`super::update::update`]. No I/O happens here.

#![allow(missing_docs)]

use crossterm::event::KeyEvent;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::theme::Theme;
use super::widgets::box_composition;
use crate::design::factors::{BoxColor, BoxSide};
use crate::present::{BoxLayout, BoxScene, EvidenceFrame, Notice, RatingPrompt};

/// Longest identifier the prompt accepts.
pub const SUBJECT_INPUT_LIMIT: usize = 64;

/// Starting slider position, in percent.
pub const SLIDER_START: u8 = 50;

// ──────────────────── input modes ────────────────────

/// What the keyboard currently controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Only Esc does anything.
    Idle,
    Rating { prompt: RatingPrompt, percent: u8 },
    Choice,
    Acknowledge,
    Subject { buffer: String, error: Option<String> },
}

// ──────────────────── model ────────────────────

#[derive(Debug)]
pub struct BeadsModel {
    pub scene: Option<BoxScene>,
    /// Shuffled bead positions for the left and right boxes.
    pub cells: [Vec<BoxColor>; 2],
    pub evidence: Option<EvidenceFrame>,
    pub notice: Option<Notice>,
    pub input: InputMode,
    pub terminal_size: (u16, u16),
    pub theme: Theme,
    rng: StdRng,
}

impl BeadsModel {
    #[must_use]
    pub fn new(terminal_size: (u16, u16), theme: Theme, seed: u64) -> Self {
        Self {
            scene: None,
            cells: [Vec::new(), Vec::new()],
            evidence: None,
            notice: None,
            input: InputMode::Idle,
            terminal_size,
            theme,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Adopt a new scene. A `Together` scene starts a trial: bead positions
    /// are reshuffled and old evidence is dropped.
    pub fn set_scene(&mut self, scene: BoxScene) {
        let new_trial = scene.layout == BoxLayout::Together || self.cells[0].is_empty();
        if new_trial {
            for (slot, side) in [BoxSide::Left, BoxSide::Right].into_iter().enumerate() {
                let mut cells = box_composition(scene.box_at(side));
                cells.shuffle(&mut self.rng);
                self.cells[slot] = cells;
            }
            self.evidence = None;
        }
        self.notice = None;
        self.scene = Some(scene);
    }

    /// Blank everything except the keyboard mode.
    pub fn clear(&mut self) {
        self.scene = None;
        self.evidence = None;
        self.notice = None;
    }
}

// ──────────────────── messages ────────────────────

/// Events that drive state transitions in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeadsMsg {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    ShowScene(BoxScene),
    ShowEvidence(EvidenceFrame),
    ShowNotice(Notice),
    Clear,
    BeginRating(RatingPrompt),
    BeginChoice,
    BeginAcknowledge,
    BeginSubject,
    SubjectRejected(String),
}

// ──────────────────── commands ────────────────────

/// Side effects requested by the update function.
#[derive(Debug, Clone, PartialEq)]
pub enum BeadsCmd {
    None,
    CommitRating(f64),
    CommitChoice(BoxSide),
    Acknowledged,
    SubmitSubject(String),
    Abort,
}
