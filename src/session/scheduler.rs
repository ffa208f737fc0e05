//! Block layout and rest insertion for the main trial list.
//!
//! Blocks are cut from each contiguous run of trials sharing a display mode,
//! so a display switch always falls on a block boundary even when the run
//! length is not a multiple of the block size. A rest follows every block
//! except the last; the rest before a display change is announced as such
//! and can fire only once per boundary.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;

use crate::design::factors::DisplayMode;
use crate::design::ratio::BiasRatio;
use crate::present::RestKind;
use crate::trial::record::Trial;

/// One block of consecutive main trials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// 1-based block number.
    pub number: usize,
    pub display: DisplayMode,
    /// Ratio of the block's first trial.
    pub ratio: BiasRatio,
    /// Indices into the main trial list.
    pub trials: Range<usize>,
}

impl Block {
    #[must_use]
    pub fn len(&self) -> usize {
        self.trials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

/// Iteration plan over the main trials.
#[derive(Debug, Clone)]
pub struct BlockScheduler {
    blocks: Vec<Block>,
    fired_switches: BTreeSet<usize>,
}

impl BlockScheduler {
    /// Cut `trials` into blocks of at most `trials_per_block`.
    #[must_use]
    pub fn new(trials: &[Trial], trials_per_block: usize) -> Self {
        let size = trials_per_block.max(1);
        let mut blocks = Vec::new();
        let mut start = 0;
        while start < trials.len() {
            let display = trials[start].display();
            let run_end = trials[start..]
                .iter()
                .position(|t| t.display() != display)
                .map_or(trials.len(), |offset| start + offset);
            let end = (start + size).min(run_end);
            blocks.push(Block {
                number: blocks.len() + 1,
                display,
                ratio: trials[start].ratio(),
                trials: start..end,
            });
            start = end;
        }
        Self {
            blocks,
            fired_switches: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Kind of rest that follows block `number`, if any.
    ///
    /// Pure lookup; use [`Self::take_rest`] while running a session.
    #[must_use]
    pub fn rest_after(&self, number: usize) -> Option<RestKind> {
        let idx = number.checked_sub(1)?;
        let current = self.blocks.get(idx)?;
        let next = self.blocks.get(idx + 1)?;
        if next.display == current.display {
            Some(RestKind::Regular)
        } else {
            Some(RestKind::DisplaySwitch)
        }
    }

    /// Like [`Self::rest_after`], but a display-switch rest is handed out at
    /// most once per boundary. A repeated request yields no rest.
    pub fn take_rest(&mut self, number: usize) -> Option<RestKind> {
        match self.rest_after(number)? {
            RestKind::DisplaySwitch if !self.fired_switches.insert(number) => None,
            kind => Some(kind),
        }
    }

    /// Number of blocks per display mode, for the overview notice.
    #[must_use]
    pub fn blocks_with_display(&self, display: DisplayMode) -> usize {
        self.blocks.iter().filter(|b| b.display == display).count()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::design::bank::{BeadSequence, SequenceBank};
    use crate::design::factors::BoxColor;
    use crate::design::factory::TrialFactory;

    fn reference_trials() -> Vec<Trial> {
        let bank = SequenceBank::reference();
        TrialFactory::new(&bank)
            .generate_main_trials(
                &[DisplayMode::Visual, DisplayMode::Numeric],
                &[
                    BiasRatio::Sixty,
                    BiasRatio::Ninety,
                    BiasRatio::Sixty,
                    BiasRatio::Ninety,
                ],
                &mut StdRng::seed_from_u64(21),
            )
            .unwrap()
    }

    #[test]
    fn reference_session_has_eight_blocks_and_one_switch() {
        let scheduler = BlockScheduler::new(&reference_trials(), 8);
        assert_eq!(scheduler.blocks().len(), 8);
        assert!(scheduler.blocks().iter().all(|b| b.len() == 8));
        let rests: Vec<Option<RestKind>> = (1..=8).map(|n| scheduler.rest_after(n)).collect();
        assert_eq!(rests[3], Some(RestKind::DisplaySwitch));
        assert_eq!(rests[7], None);
        let regular = rests
            .iter()
            .filter(|r| **r == Some(RestKind::Regular))
            .count();
        assert_eq!(regular, 6);
        assert_eq!(scheduler.blocks_with_display(DisplayMode::Visual), 4);
    }

    #[test]
    fn switch_rest_fires_once() {
        let mut scheduler = BlockScheduler::new(&reference_trials(), 8);
        assert_eq!(scheduler.take_rest(4), Some(RestKind::DisplaySwitch));
        assert_eq!(scheduler.take_rest(4), None);
        assert_eq!(scheduler.take_rest(3), Some(RestKind::Regular));
        assert_eq!(scheduler.take_rest(8), None);
        assert_eq!(scheduler.take_rest(0), None);
    }

    #[test]
    fn uneven_block_size_still_breaks_at_display_switch() {
        let trials = reference_trials();
        let scheduler = BlockScheduler::new(&trials, 10);
        // 32 trials per display → 10, 10, 10, 2 per run.
        let sizes: Vec<usize> = scheduler.blocks().iter().map(Block::len).collect();
        assert_eq!(sizes, vec![10, 10, 10, 2, 10, 10, 10, 2]);
        assert_eq!(scheduler.rest_after(4), Some(RestKind::DisplaySwitch));
        assert!(
            scheduler.blocks()[..4]
                .iter()
                .all(|b| b.display == DisplayMode::Visual)
        );
    }

    #[test]
    fn single_display_has_no_switch() {
        let seq = BeadSequence::from_bits([1; 8]);
        let trials: Vec<Trial> = (0..16)
            .map(|_| Trial::new(BoxColor::Green, DisplayMode::Numeric, BiasRatio::Sixty, seq))
            .collect();
        let scheduler = BlockScheduler::new(&trials, 8);
        assert_eq!(scheduler.rest_after(1), Some(RestKind::Regular));
        assert_eq!(scheduler.rest_after(2), None);
    }

    #[test]
    fn empty_list_has_no_blocks() {
        let scheduler = BlockScheduler::new(&[], 8);
        assert!(scheduler.blocks().is_empty());
        assert_eq!(scheduler.rest_after(1), None);
    }
}
