//! Frame composition. Output is raw-mode text: lines end in `\r\n`.

#![allow(missing_docs)]

use super::layout::{BOX_WIDTH, place_boxes};
use super::model::{BeadsModel, InputMode};
use super::theme::SemanticToken;
use super::widgets::{box_lines, hint, numeric_summary, slider, visual_record};
use crate::design::factors::{BoxSide, DisplayMode};

const LINE_END: &str = "\r\n";
const MIN_SLIDER_WIDTH: usize = 21;
const MAX_SLIDER_WIDTH: usize = 61;

/// Render the whole screen for the current model state.
#[must_use]
pub fn render(model: &BeadsModel) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let InputMode::Subject { buffer, error } = &model.input {
        render_subject_prompt(model, buffer, error.as_deref(), &mut lines);
        return lines.join(LINE_END);
    }

    if let Some(notice) = &model.notice {
        lines.push(String::new());
        for line in notice.text().lines() {
            lines.push(format!("  {line}"));
        }
        if model.input == InputMode::Acknowledge {
            lines.push(String::new());
            lines.push(format!(
                "  {}",
                hint("Press any key to continue.", &model.theme)
            ));
        }
        return lines.join(LINE_END);
    }

    render_scene(model, &mut lines);
    render_evidence(model, &mut lines);
    render_input(model, &mut lines);
    lines.join(LINE_END)
}

fn render_subject_prompt(
    model: &BeadsModel,
    buffer: &str,
    error: Option<&str>,
    lines: &mut Vec<String>,
) {
    let theme = &model.theme;
    lines.push(String::new());
    lines.push(format!(
        "  {}",
        theme.token("Participant ID:", SemanticToken::Prompt)
    ));
    lines.push(format!("  > {buffer}_"));
    if let Some(reason) = error {
        lines.push(format!("  {}", theme.token(reason, SemanticToken::Emphasis)));
    }
    lines.push(String::new());
    lines.push(format!(
        "  {}",
        hint("Enter to confirm, Esc to cancel", theme)
    ));
}

fn render_scene(model: &BeadsModel, lines: &mut Vec<String>) {
    let Some(scene) = &model.scene else {
        return;
    };
    let placement = place_boxes(scene.layout, model.terminal_size.0);
    let left = box_lines(
        scene.box_at(BoxSide::Left),
        &model.cells[0],
        &model.theme,
    );
    let right = box_lines(
        scene.box_at(BoxSide::Right),
        &model.cells[1],
        &model.theme,
    );
    let left_pad = " ".repeat(usize::from(placement.left_col));
    let gap = " ".repeat(usize::from(placement.gap));
    lines.push(String::new());
    for (l, r) in left.iter().zip(&right) {
        lines.push(format!("{left_pad}{l}{gap}{r}"));
    }
}

fn render_evidence(model: &BeadsModel, lines: &mut Vec<String>) {
    let Some(frame) = &model.evidence else {
        return;
    };
    lines.push(String::new());
    if let Some(latest) = frame.latest() {
        lines.push(format!(
            "  Bead {} of {}: {}",
            frame.step,
            frame.total,
            model.theme.bead(latest)
        ));
    }
    match frame.display {
        DisplayMode::Visual => {
            lines.push(format!("  Beads drawn: {}", visual_record(frame, &model.theme)));
        }
        DisplayMode::Numeric => {
            for line in numeric_summary(frame, &model.theme) {
                lines.push(format!("  {line}"));
            }
        }
    }
}

fn render_input(model: &BeadsModel, lines: &mut Vec<String>) {
    let theme = &model.theme;
    match &model.input {
        InputMode::Rating { prompt, percent } => {
            let width = usize::from(model.terminal_size.0)
                .saturating_sub(usize::from(BOX_WIDTH))
                .clamp(MIN_SLIDER_WIDTH, MAX_SLIDER_WIDTH);
            lines.push(String::new());
            lines.push(format!("  {}", theme.token(prompt.text(), SemanticToken::Prompt)));
            lines.push(format!("  Left box {}  Right box", slider(*percent, width)));
            lines.push(format!(
                "  {}",
                hint("←/→ adjust (Shift: 10%), Enter to confirm", theme)
            ));
        }
        InputMode::Choice => {
            lines.push(String::new());
            lines.push(format!(
                "  {}",
                theme.token(
                    "Which box do you think the beads were drawn from?",
                    SemanticToken::Prompt
                )
            ));
            lines.push(format!("  {}", hint("← left box   right box →", theme)));
        }
        InputMode::Idle | InputMode::Acknowledge | InputMode::Subject { .. } => {}
    }
}
