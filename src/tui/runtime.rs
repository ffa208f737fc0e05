//! Crossterm-backed [`Presentation`]: the participant-facing runtime.
//!
//! Every core call becomes a [`BeadsMsg`] fed through [`update`], followed
//! by a redraw. Blocking calls pump terminal events in short poll slices so
//! the abort token is honoured within [`POLL_SLICE`]. Terminal I/O failures
//! never escape as panics: they are stored, the token is triggered, and the
//! core sees an ordinary abort. The CLI collects the stored error with
//! [`TerminalPresenter::take_failure`].

#![allow(missing_docs)]

use std::io::{self, Write as _};
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use super::input::map_event;
use super::model::{BeadsCmd, BeadsModel, BeadsMsg, InputMode};
use super::render::render;
use super::terminal_guard::TerminalGuard;
use super::theme::{AccessibilityProfile, Theme};
use super::update::update;
use crate::core::errors::{BeadsError, Result};
use crate::design::factors::BoxSide;
use crate::present::{
    AbortToken, Aborted, BoxScene, EvidenceFrame, Flow, Notice, Presentation, RatingPrompt,
};

/// Longest stretch without checking the abort token.
pub const POLL_SLICE: Duration = Duration::from_millis(50);

pub struct TerminalPresenter {
    model: BeadsModel,
    token: AbortToken,
    out: io::Stdout,
    failure: Option<BeadsError>,
    // Dropped last so the final frame is gone before the terminal is restored.
    _guard: TerminalGuard,
}

impl TerminalPresenter {
    /// Take over the terminal.
    ///
    /// `seed` drives bead placement inside the box drawings.
    ///
    /// # Errors
    /// `BDS-3003` when the terminal cannot enter raw mode.
    pub fn open(token: AbortToken, profile: AccessibilityProfile, seed: u64) -> Result<Self> {
        let guard = TerminalGuard::new()?;
        let model = BeadsModel::new(TerminalGuard::terminal_size(), Theme::new(profile), seed);
        Ok(Self {
            model,
            token,
            out: io::stdout(),
            failure: None,
            _guard: guard,
        })
    }

    /// The terminal error that turned into an abort, if any.
    pub fn take_failure(&mut self) -> Option<BeadsError> {
        self.failure.take()
    }

    /// Ask for a participant id until `validate` accepts one.
    ///
    /// Rejections are shown under the input line and editing continues.
    ///
    /// # Errors
    /// [`Aborted`] on Esc, Ctrl-C, a signal, or a terminal failure.
    pub fn prompt_subject<T>(
        &mut self,
        mut validate: impl FnMut(&str) -> std::result::Result<T, String>,
    ) -> Flow<T> {
        self.apply(BeadsMsg::BeginSubject)?;
        loop {
            if let BeadsCmd::SubmitSubject(raw) = self.await_cmd()? {
                match validate(&raw) {
                    Ok(accepted) => {
                        self.model.input = InputMode::Idle;
                        self.apply(BeadsMsg::Clear)?;
                        return Ok(accepted);
                    }
                    Err(reason) => self.apply(BeadsMsg::SubjectRejected(reason))?,
                }
            }
        }
    }

    fn fail(&mut self, err: &io::Error) -> Aborted {
        self.failure.get_or_insert_with(|| BeadsError::Terminal {
            details: err.to_string(),
        });
        self.token.trigger();
        Aborted
    }

    fn draw(&mut self) -> Flow<()> {
        let frame = render(&self.model);
        let written = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
            .and_then(|()| self.out.write_all(frame.as_bytes()))
            .and_then(|()| self.out.flush());
        written.map_err(|err| self.fail(&err))
    }

    fn apply(&mut self, msg: BeadsMsg) -> Flow<()> {
        self.token.check()?;
        let _ = update(&mut self.model, msg);
        self.draw()
    }

    /// Pump events until a command surfaces or `deadline` passes.
    fn pump(&mut self, deadline: Option<Instant>) -> Flow<Option<BeadsCmd>> {
        loop {
            self.token.check()?;
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    (deadline - now).min(POLL_SLICE)
                }
                None => POLL_SLICE,
            };
            if !event::poll(slice).map_err(|err| self.fail(&err))? {
                continue;
            }
            let raw = event::read().map_err(|err| self.fail(&err))?;
            let Some(msg) = map_event(raw) else {
                continue;
            };
            let cmd = update(&mut self.model, msg);
            self.draw()?;
            match cmd {
                BeadsCmd::None => {}
                BeadsCmd::Abort => {
                    self.token.trigger();
                    return Err(Aborted);
                }
                other => return Ok(Some(other)),
            }
        }
    }

    fn await_cmd(&mut self) -> Flow<BeadsCmd> {
        loop {
            if let Some(cmd) = self.pump(None)? {
                return Ok(cmd);
            }
        }
    }
}

impl Presentation for TerminalPresenter {
    fn render_boxes(&mut self, scene: &BoxScene) -> Flow<()> {
        self.apply(BeadsMsg::ShowScene(*scene))
    }

    fn render_evidence_step(&mut self, frame: &EvidenceFrame) -> Flow<()> {
        self.apply(BeadsMsg::ShowEvidence(frame.clone()))
    }

    fn collect_continuous_rating(&mut self, prompt: RatingPrompt) -> Flow<f64> {
        self.apply(BeadsMsg::BeginRating(prompt))?;
        loop {
            if let BeadsCmd::CommitRating(value) = self.await_cmd()? {
                return Ok(value);
            }
        }
    }

    fn collect_discrete_choice(&mut self) -> Flow<BoxSide> {
        self.apply(BeadsMsg::BeginChoice)?;
        loop {
            if let BeadsCmd::CommitChoice(side) = self.await_cmd()? {
                return Ok(side);
            }
        }
    }

    fn show_notice(&mut self, notice: &Notice) -> Flow<()> {
        self.apply(BeadsMsg::ShowNotice(notice.clone()))
    }

    fn await_acknowledgement(&mut self) -> Flow<()> {
        self.apply(BeadsMsg::BeginAcknowledge)?;
        loop {
            if self.await_cmd()? == BeadsCmd::Acknowledged {
                return Ok(());
            }
        }
    }

    fn clear(&mut self) -> Flow<()> {
        self.apply(BeadsMsg::Clear)
    }

    fn wait(&mut self, duration: Duration) -> Flow<()> {
        let deadline = Instant::now() + duration;
        while self.pump(Some(deadline))?.is_some() {}
        Ok(())
    }

    fn poll_abort(&mut self) -> bool {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    self.fail(&err);
                    break;
                }
            }
            match event::read() {
                Ok(raw) => {
                    if let Some(msg) = map_event(raw) {
                        if update(&mut self.model, msg) == BeadsCmd::Abort {
                            self.token.trigger();
                        }
                    }
                }
                Err(err) => {
                    self.fail(&err);
                    break;
                }
            }
        }
        self.token.is_triggered()
    }
}
