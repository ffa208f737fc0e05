//! Pure state transitions: `update(model, msg) -> cmd`.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::model::{BeadsCmd, BeadsModel, BeadsMsg, InputMode, SLIDER_START, SUBJECT_INPUT_LIMIT};
use crate::design::factors::BoxSide;

const FINE_STEP: u8 = 1;
const COARSE_STEP: u8 = 10;

/// Apply `msg` to `model`, returning the side effect it requests.
pub fn update(model: &mut BeadsModel, msg: BeadsMsg) -> BeadsCmd {
    match msg {
        BeadsMsg::Key(key) => handle_key(model, key),
        BeadsMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            BeadsCmd::None
        }
        BeadsMsg::ShowScene(scene) => {
            model.set_scene(scene);
            BeadsCmd::None
        }
        BeadsMsg::ShowEvidence(frame) => {
            model.evidence = Some(frame);
            BeadsCmd::None
        }
        BeadsMsg::ShowNotice(notice) => {
            model.clear();
            model.notice = Some(notice);
            BeadsCmd::None
        }
        BeadsMsg::Clear => {
            model.clear();
            BeadsCmd::None
        }
        BeadsMsg::BeginRating(prompt) => {
            model.input = InputMode::Rating {
                prompt,
                percent: SLIDER_START,
            };
            BeadsCmd::None
        }
        BeadsMsg::BeginChoice => {
            model.input = InputMode::Choice;
            BeadsCmd::None
        }
        BeadsMsg::BeginAcknowledge => {
            model.input = InputMode::Acknowledge;
            BeadsCmd::None
        }
        BeadsMsg::BeginSubject => {
            model.clear();
            model.input = InputMode::Subject {
                buffer: String::new(),
                error: None,
            };
            BeadsCmd::None
        }
        BeadsMsg::SubjectRejected(reason) => {
            if let InputMode::Subject { error, .. } = &mut model.input {
                *error = Some(reason);
            }
            BeadsCmd::None
        }
    }
}

fn is_abort(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

fn handle_key(model: &mut BeadsModel, key: KeyEvent) -> BeadsCmd {
    if is_abort(&key) {
        model.input = InputMode::Idle;
        return BeadsCmd::Abort;
    }
    let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
    match &mut model.input {
        InputMode::Idle => BeadsCmd::None,
        InputMode::Rating { percent, .. } => match key.code {
            KeyCode::Left => {
                *percent = percent.saturating_sub(if coarse { COARSE_STEP } else { FINE_STEP });
                BeadsCmd::None
            }
            KeyCode::Right => {
                *percent = percent
                    .saturating_add(if coarse { COARSE_STEP } else { FINE_STEP })
                    .min(100);
                BeadsCmd::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let value = f64::from(*percent) / 100.0;
                model.input = InputMode::Idle;
                BeadsCmd::CommitRating(value)
            }
            _ => BeadsCmd::None,
        },
        InputMode::Choice => {
            let side = match key.code {
                KeyCode::Left => BoxSide::Left,
                KeyCode::Right => BoxSide::Right,
                _ => return BeadsCmd::None,
            };
            model.input = InputMode::Idle;
            BeadsCmd::CommitChoice(side)
        }
        InputMode::Acknowledge => {
            model.input = InputMode::Idle;
            BeadsCmd::Acknowledged
        }
        InputMode::Subject { buffer, error } => match key.code {
            KeyCode::Char(c) if buffer.chars().count() < SUBJECT_INPUT_LIMIT => {
                buffer.push(c);
                *error = None;
                BeadsCmd::None
            }
            KeyCode::Backspace => {
                buffer.pop();
                BeadsCmd::None
            }
            KeyCode::Enter => BeadsCmd::SubmitSubject(buffer.clone()),
            _ => BeadsCmd::None,
        },
    }
}
