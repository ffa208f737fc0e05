//! Horizontal placement of the two boxes and the slider between them.

#![allow(missing_docs)]

use crate::present::BoxLayout;

/// Width of one box drawing: 10 beads at 2 columns each plus borders.
pub const BOX_WIDTH: u16 = 22;

const MIN_TOGETHER_GAP: u16 = 4;

/// Column offsets for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    pub left_col: u16,
    pub right_col: u16,
    /// Columns available between the boxes for the slider.
    pub gap: u16,
}

/// Place the boxes for `layout` on a terminal `cols` wide.
///
/// `Apart` pushes the boxes to the edges; `Together` centres them with a
/// small gap. Narrow terminals degrade to a zero-width gap.
#[must_use]
pub fn place_boxes(layout: BoxLayout, cols: u16) -> SceneLayout {
    let both = BOX_WIDTH.saturating_mul(2);
    let spare = cols.saturating_sub(both);
    match layout {
        BoxLayout::Apart => {
            let margin = (spare / 10).min(4);
            let gap = spare.saturating_sub(margin.saturating_mul(2));
            SceneLayout {
                left_col: margin,
                right_col: margin + BOX_WIDTH + gap,
                gap,
            }
        }
        BoxLayout::Together => {
            let gap = MIN_TOGETHER_GAP.min(spare);
            let left = spare.saturating_sub(gap) / 2;
            SceneLayout {
                left_col: left,
                right_col: left + BOX_WIDTH + gap,
                gap,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apart_leaves_more_room_than_together() {
        let apart = place_boxes(BoxLayout::Apart, 120);
        let together = place_boxes(BoxLayout::Together, 120);
        assert!(apart.gap > together.gap);
        assert!(apart.left_col < together.left_col);
        assert!(apart.right_col + BOX_WIDTH <= 120);
    }

    #[test]
    fn narrow_terminal_does_not_underflow() {
        let layout = place_boxes(BoxLayout::Apart, 30);
        assert_eq!(layout.gap, 0);
        assert_eq!(layout.left_col, 0);
        assert_eq!(layout.right_col, BOX_WIDTH);
    }
}
