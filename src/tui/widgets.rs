//! Text widgets: bead boxes, the rating slider, and the evidence displays.

#![allow(missing_docs)]

use super::layout::BOX_WIDTH;
use super::theme::{SemanticToken, Theme};
use crate::design::factors::BoxColor;
use crate::present::{BoxDescriptor, EvidenceFrame};

/// Beads per row in a box drawing.
pub const GRID_COLUMNS: usize = 10;

/// 100 bead colours for a box, majority first (callers shuffle positions).
#[must_use]
pub fn box_composition(descriptor: &BoxDescriptor) -> Vec<BoxColor> {
    let majority = usize::from(descriptor.majority_percent);
    let minority = usize::from(descriptor.minority_percent);
    std::iter::repeat_n(descriptor.color, majority)
        .chain(std::iter::repeat_n(descriptor.color.other(), minority))
        .collect()
}

/// Bordered drawing of one box, every line exactly [`BOX_WIDTH`] columns wide.
#[must_use]
pub fn box_lines(descriptor: &BoxDescriptor, cells: &[BoxColor], theme: &Theme) -> Vec<String> {
    let inner = usize::from(BOX_WIDTH) - 2;
    let (h, v, tl, tr, bl, br) = if descriptor.highlighted {
        ('═', '║', '╔', '╗', '╚', '╝')
    } else {
        ('─', '│', '┌', '┐', '└', '┘')
    };
    let label = format!("{} Box", capitalised(descriptor.color));
    let mut lines = Vec::with_capacity(cells.len() / GRID_COLUMNS + 3);
    lines.push(format!(
        "{:^width$}",
        label,
        width = usize::from(BOX_WIDTH)
    ));
    lines.push(format!("{tl}{}{tr}", h.to_string().repeat(inner)));
    for row in cells.chunks(GRID_COLUMNS) {
        let mut line = String::new();
        line.push(v);
        for color in row {
            line.push_str(&theme.bead(*color));
            line.push(' ');
        }
        for _ in row.len()..GRID_COLUMNS {
            line.push_str("  ");
        }
        line.push(v);
        lines.push(line);
    }
    lines.push(format!("{bl}{}{br}", h.to_string().repeat(inner)));
    let summary = format!(
        "{}% {} / {}% {}",
        descriptor.majority_percent,
        descriptor.color,
        descriptor.minority_percent,
        descriptor.color.other()
    );
    lines.push(format!("{summary:^width$}", width = usize::from(BOX_WIDTH)));
    if let Some(first) = lines.first_mut() {
        *first = theme.tinted(first, descriptor.color);
    }
    lines
}

/// Horizontal slider; the rating is the right-hand box's probability.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn slider(percent: u8, width: usize) -> String {
    let width = width.max(3);
    let pct = percent.min(100);
    let pos = (f64::from(pct) / 100.0 * (width - 1) as f64).round() as usize;
    let track: String = (0..width)
        .map(|i| if i == pos { '┃' } else { '─' })
        .collect();
    format!("{:>3}% [{track}] {:<3}%", 100 - pct, pct)
}

/// Eight slots, drawn beads coloured, the rest empty.
#[must_use]
pub fn visual_record(frame: &EvidenceFrame, theme: &Theme) -> String {
    let mut out = String::new();
    for slot in 0..frame.total {
        if slot > 0 {
            out.push(' ');
        }
        match frame.beads.get(slot) {
            Some(color) => out.push_str(&theme.bead(*color)),
            None => out.push_str(&theme.empty_slot()),
        }
    }
    out
}

/// Percentage summary of the beads drawn so far.
#[must_use]
pub fn numeric_summary(frame: &EvidenceFrame, theme: &Theme) -> Vec<String> {
    vec![
        format!(
            "Percentwise distribution of the {}/{} beads drawn so far",
            frame.step, frame.total
        ),
        format!(
            "{}   {}",
            theme.tinted(
                &format!("Blue: {:.1}%", frame.percent(BoxColor::Blue)),
                BoxColor::Blue
            ),
            theme.tinted(
                &format!("Green: {:.1}%", frame.percent(BoxColor::Green)),
                BoxColor::Green
            ),
        ),
    ]
}

/// Key help line, muted.
#[must_use]
pub fn hint(text: &str, theme: &Theme) -> String {
    theme.token(text, SemanticToken::Muted)
}

fn capitalised(color: BoxColor) -> &'static str {
    match color {
        BoxColor::Green => "Green",
        BoxColor::Blue => "Blue",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::bank::Bead;
    use crate::design::factors::{BoxSide, DisplayMode};
    use crate::design::ratio::BiasRatio;
    use crate::present::{BoxLayout, BoxScene};
    use crate::tui::theme::AccessibilityProfile;

    fn plain() -> Theme {
        Theme::new(AccessibilityProfile::from_no_color_flag(true))
    }

    #[test]
    fn composition_matches_ratio() {
        let scene = BoxScene::new(BiasRatio::Sixty, BoxColor::Green, BoxLayout::Apart);
        let cells = box_composition(scene.box_at(BoxSide::Right));
        assert_eq!(cells.len(), 100);
        assert_eq!(cells.iter().filter(|c| **c == BoxColor::Blue).count(), 60);
    }

    #[test]
    fn box_lines_have_fixed_width_without_colour() {
        let scene = BoxScene::new(BiasRatio::Ninety, BoxColor::Blue, BoxLayout::Apart);
        let descriptor = scene.box_at(BoxSide::Left);
        let lines = box_lines(descriptor, &box_composition(descriptor), &plain());
        assert_eq!(lines.len(), 10 + 4);
        for line in &lines {
            assert_eq!(line.chars().count(), usize::from(BOX_WIDTH), "{line:?}");
        }
        assert!(lines[0].contains("Green Box"));
        assert!(lines.last().unwrap().contains("90% green / 10% blue"));
    }

    #[test]
    fn highlighted_box_uses_double_border() {
        let scene = BoxScene::new(BiasRatio::Sixty, BoxColor::Green, BoxLayout::Apart)
            .with_highlight(BoxSide::Left);
        let descriptor = scene.box_at(BoxSide::Left);
        let lines = box_lines(descriptor, &box_composition(descriptor), &plain());
        assert!(lines[1].starts_with('╔'));
    }

    #[test]
    fn slider_reports_both_sides() {
        let line = slider(30, 21);
        assert!(line.starts_with(" 70%"));
        assert!(line.ends_with("30 %"));
        assert_eq!(line.matches('┃').count(), 1);
    }

    #[test]
    fn visual_record_fills_drawn_slots_only() {
        let frame = EvidenceFrame::new(
            3,
            &[Bead::Majority, Bead::Minority, Bead::Majority],
            BoxColor::Green,
            DisplayMode::Visual,
        );
        assert_eq!(visual_record(&frame, &plain()), "G B G . . . . .");
    }

    #[test]
    fn numeric_summary_uses_one_decimal() {
        let frame = EvidenceFrame::new(
            3,
            &[Bead::Majority, Bead::Minority, Bead::Majority],
            BoxColor::Blue,
            DisplayMode::Numeric,
        );
        let lines = numeric_summary(&frame, &plain());
        assert_eq!(lines[0], "Percentwise distribution of the 3/8 beads drawn so far");
        assert_eq!(lines[1], "Blue: 66.7%   Green: 33.3%");
    }
}
