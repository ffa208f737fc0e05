//! Counterbalanced trial generation.
//!
//! For every display-mode value the factory shuffles an independent copy of
//! each ratio's bank, splits it at the midpoint, and lays the halves out in
//! block order. The k-th appearance of a ratio in the block order consumes
//! that ratio's k-th half, so the reference order `[60, 90, 60, 90]` yields
//! `[first(60), first(90), second(60), second(90)]`. Each bank is therefore
//! partitioned, never resampled, once per display mode.
//!
//! Practice trials sample one sequence per display mode × ratio with
//! replacement, independent of the main partition.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::bank::{BeadSequence, EVIDENCE_WEIGHTS, SequenceBank};
use super::factors::{BoxColor, DisplayMode};
use super::ratio::BiasRatio;
use crate::core::errors::{BeadsError, Result};
use crate::trial::record::Trial;

/// Every ratio must appear this many times in the block order (two halves).
const APPEARANCES_PER_RATIO: usize = 2;

/// Distinct ratios in the order they first appear in `block_order`.
#[must_use]
pub fn distinct_in_order(block_order: &[BiasRatio]) -> Vec<BiasRatio> {
    let mut seen = Vec::new();
    for ratio in block_order {
        if !seen.contains(ratio) {
            seen.push(*ratio);
        }
    }
    seen
}

/// Where one block-order slot draws its sequences from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkSlot {
    pub ratio: BiasRatio,
    /// `0` for the first half of the shuffled bank, `1` for the second.
    pub half: usize,
}

/// Builds main and practice trial lists from a sequence bank.
#[derive(Debug, Clone, Copy)]
pub struct TrialFactory<'a> {
    bank: &'a SequenceBank,
}

impl<'a> TrialFactory<'a> {
    #[must_use]
    pub const fn new(bank: &'a SequenceBank) -> Self {
        Self { bank }
    }

    /// Check the block order against the bank and resolve each slot's chunk.
    ///
    /// Fails with `InvalidDesign` unless the order references exactly two
    /// distinct ratios, each appearing exactly twice, each with a non-empty
    /// bank.
    pub fn chunk_layout(&self, block_order: &[BiasRatio]) -> Result<Vec<ChunkSlot>> {
        let distinct = distinct_in_order(block_order);
        if distinct.len() != 2 {
            return Err(BeadsError::design(format!(
                "block order must reference exactly two distinct ratios, found {}",
                distinct.len()
            )));
        }
        for ratio in &distinct {
            let appearances = block_order.iter().filter(|r| *r == ratio).count();
            if appearances != APPEARANCES_PER_RATIO {
                return Err(BeadsError::design(format!(
                    "ratio {ratio} appears {appearances} times in the block order; \
                     each ratio must appear exactly {APPEARANCES_PER_RATIO} times"
                )));
            }
            if self.bank.sequences_for(*ratio).is_empty() {
                return Err(BeadsError::design(format!(
                    "sequence bank for ratio {ratio} is empty"
                )));
            }
        }

        let mut consumed = [0_usize; 2];
        let slots = block_order
            .iter()
            .map(|ratio| {
                let idx = usize::from(*ratio != distinct[0]);
                let half = consumed[idx];
                consumed[idx] += 1;
                ChunkSlot {
                    ratio: *ratio,
                    half,
                }
            })
            .collect();
        Ok(slots)
    }

    /// Generate the authoritative, ordered main-trial list.
    pub fn generate_main_trials<R: Rng + ?Sized>(
        &self,
        display_factors: &[DisplayMode],
        block_order: &[BiasRatio],
        rng: &mut R,
    ) -> Result<Vec<Trial>> {
        let layout = self.chunk_layout(block_order)?;
        let distinct = distinct_in_order(block_order);
        let mut trials = Vec::with_capacity(display_factors.len() * self.bank.total());

        for display in display_factors {
            let halves: Vec<(BiasRatio, [Vec<BeadSequence>; 2])> = distinct
                .iter()
                .map(|ratio| (*ratio, shuffled_halves(self.bank.sequences_for(*ratio), rng)))
                .collect();

            for slot in &layout {
                let Some((_, chunks)) = halves.iter().find(|(r, _)| *r == slot.ratio) else {
                    continue;
                };
                for sequence in &chunks[slot.half] {
                    trials.push(Trial::new(
                        random_color(rng),
                        *display,
                        slot.ratio,
                        *sequence,
                    ));
                }
            }
        }
        Ok(trials)
    }

    /// One trial per display mode × ratio, sequence drawn with replacement.
    pub fn generate_practice_trials<R: Rng + ?Sized>(
        &self,
        display_factors: &[DisplayMode],
        ratios: &[BiasRatio],
        rng: &mut R,
    ) -> Result<Vec<Trial>> {
        let mut trials = Vec::with_capacity(display_factors.len() * ratios.len());
        for display in display_factors {
            for ratio in ratios {
                let sequence = self
                    .bank
                    .sequences_for(*ratio)
                    .choose(rng)
                    .copied()
                    .ok_or_else(|| {
                        BeadsError::design(format!("sequence bank for ratio {ratio} is empty"))
                    })?;
                trials.push(Trial::new(random_color(rng), *display, *ratio, sequence));
            }
        }
        Ok(trials)
    }
}

/// Shuffle a copy and split at `len / 2` (an odd count puts the extra
/// sequence in the second half).
fn shuffled_halves<R: Rng + ?Sized>(
    sequences: &[BeadSequence],
    rng: &mut R,
) -> [Vec<BeadSequence>; 2] {
    let mut pool = sequences.to_vec();
    pool.shuffle(rng);
    let second = pool.split_off(pool.len() / 2);
    [pool, second]
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> BoxColor {
    if rng.random_bool(0.5) {
        BoxColor::Green
    } else {
        BoxColor::Blue
    }
}

/// SHA-256 over the bank, weights, block order, and display order.
#[must_use]
pub fn design_fingerprint(
    bank: &SequenceBank,
    block_order: &[BiasRatio],
    display_order: &[DisplayMode],
) -> String {
    let mut hasher = Sha256::new();
    for ratio in BiasRatio::ALL {
        hasher.update([ratio.majority_percent(), ratio.minority_percent()]);
        for sequence in bank.sequences_for(ratio) {
            hasher.update(sequence.bits());
        }
        hasher.update(b";");
    }
    for weight in EVIDENCE_WEIGHTS.values() {
        hasher.update(weight.to_le_bytes());
    }
    hasher.update(b"|order:");
    for ratio in block_order {
        hasher.update([ratio.majority_percent()]);
    }
    hasher.update(b"|display:");
    for display in display_order {
        hasher.update(display.as_str().as_bytes());
        hasher.update(b",");
    }
    format!("{:x}", hasher.finalize())
}
