//! Pre-authored bead sequences per bias ratio, and the evidence weights.
//!
//! The bank is a fixed design table, not generated data. Duplicate sequences
//! inside a ratio's list are part of the design and are preserved.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ratio::BiasRatio;
use crate::design::factors::BoxColor;

/// Number of beads revealed per trial.
pub const BEADS_PER_SEQUENCE: usize = 8;

/// One revealed bead, relative to the hidden box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum Bead {
    /// Minority-colour bead (`0`).
    Minority,
    /// Majority-colour bead (`1`).
    Majority,
}

impl Bead {
    /// Map a design-table bit; any non-zero bit is a majority bead.
    #[must_use]
    pub const fn from_bit(bit: u8) -> Self {
        if bit == 0 { Self::Minority } else { Self::Majority }
    }

    /// `1` for majority, `0` for minority.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::Minority => 0,
            Self::Majority => 1,
        }
    }

    /// Concrete colour of this bead when `hidden` is the source box.
    #[must_use]
    pub const fn color(self, hidden: BoxColor) -> BoxColor {
        match self {
            Self::Majority => hidden,
            Self::Minority => hidden.other(),
        }
    }
}

impl From<u8> for Bead {
    fn from(value: u8) -> Self {
        Self::from_bit(value)
    }
}

impl From<Bead> for u8 {
    fn from(value: Bead) -> Self {
        value.bit()
    }
}

/// Ordered sequence of [`BEADS_PER_SEQUENCE`] beads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeadSequence([Bead; BEADS_PER_SEQUENCE]);

impl BeadSequence {
    /// Build a sequence from design-table bits.
    #[must_use]
    pub const fn from_bits(bits: [u8; BEADS_PER_SEQUENCE]) -> Self {
        let mut beads = [Bead::Minority; BEADS_PER_SEQUENCE];
        let mut i = 0;
        while i < BEADS_PER_SEQUENCE {
            beads[i] = Bead::from_bit(bits[i]);
            i += 1;
        }
        Self(beads)
    }

    #[must_use]
    pub const fn beads(&self) -> &[Bead; BEADS_PER_SEQUENCE] {
        &self.0
    }

    #[must_use]
    pub fn bits(&self) -> [u8; BEADS_PER_SEQUENCE] {
        self.0.map(Bead::bit)
    }

    /// Always [`BEADS_PER_SEQUENCE`].
    #[must_use]
    pub const fn len(&self) -> usize {
        BEADS_PER_SEQUENCE
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Beads `1..=step` (the cumulative evidence after `step` reveals).
    #[must_use]
    pub fn prefix(&self, step: usize) -> &[Bead] {
        &self.0[..step.min(BEADS_PER_SEQUENCE)]
    }

    /// Number of majority-valued beads.
    #[must_use]
    pub fn majority_count(&self) -> usize {
        self.0.iter().filter(|b| **b == Bead::Majority).count()
    }

    /// Comma-delimited bit list, e.g. `1,1,0,1,1,1,0,0`.
    #[must_use]
    pub fn to_delimited(&self) -> String {
        self.0
            .iter()
            .map(|b| b.bit().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for BeadSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_delimited())
    }
}

/// Per-position log-odds-like weights used for evidence asymmetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceWeights([f64; BEADS_PER_SEQUENCE]);

/// The fixed, process-wide weight table.
pub const EVIDENCE_WEIGHTS: EvidenceWeights =
    EvidenceWeights([-3.5, -2.5, -1.5, -0.5, 0.5, 1.5, 2.5, 3.5]);

impl EvidenceWeights {
    #[must_use]
    pub const fn values(&self) -> &[f64; BEADS_PER_SEQUENCE] {
        &self.0
    }

    /// `Σ bead_i × weight_i`; a pure function of the sequence.
    #[must_use]
    pub fn asymmetry(&self, sequence: &BeadSequence) -> f64 {
        sequence
            .beads()
            .iter()
            .zip(self.0.iter())
            .map(|(bead, weight)| f64::from(bead.bit()) * weight)
            .sum()
    }
}

const REFERENCE_60: [[u8; BEADS_PER_SEQUENCE]; 16] = [
    [1, 1, 1, 1, 1, 0, 0, 0],
    [0, 0, 0, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1, 0],
    [0, 1, 1, 0, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 1, 1, 1],
    [1, 0, 1, 1, 1, 1, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 0],
    [0, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 0, 1, 1],
    [1, 1, 0, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 0, 1, 0, 0],
    [0, 0, 1, 0, 1, 1, 1, 1],
    [1, 1, 0, 1, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 0, 1, 1],
];

// 11 mixed sequences shared with the 60/40 bank, then 5 all-majority draws.
const REFERENCE_90: [[u8; BEADS_PER_SEQUENCE]; 16] = [
    [1, 1, 1, 1, 1, 0, 0, 0],
    [0, 0, 0, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 0, 1, 1, 0],
    [0, 1, 1, 0, 1, 1, 1, 0],
    [1, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 1, 1, 1],
    [1, 0, 1, 1, 1, 1, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 0],
    [0, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 0, 1, 1],
    [1, 1, 0, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
];

/// Immutable catalog of sequences per ratio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceBank {
    sequences: BTreeMap<BiasRatio, Vec<BeadSequence>>,
}

impl SequenceBank {
    /// Build a bank from explicit per-ratio lists (order preserved).
    #[must_use]
    pub fn new(sequences: BTreeMap<BiasRatio, Vec<BeadSequence>>) -> Self {
        Self { sequences }
    }

    /// The reference design table: 16 sequences for each ratio.
    #[must_use]
    pub fn reference() -> Self {
        let mut sequences = BTreeMap::new();
        sequences.insert(
            BiasRatio::Sixty,
            REFERENCE_60.iter().copied().map(BeadSequence::from_bits).collect(),
        );
        sequences.insert(
            BiasRatio::Ninety,
            REFERENCE_90.iter().copied().map(BeadSequence::from_bits).collect(),
        );
        Self { sequences }
    }

    /// Sequences authored for `ratio`; empty when the ratio has none.
    #[must_use]
    pub fn sequences_for(&self, ratio: BiasRatio) -> &[BeadSequence] {
        self.sequences.get(&ratio).map_or(&[], Vec::as_slice)
    }

    /// Ratios with at least one sequence, ascending.
    pub fn ratios(&self) -> impl Iterator<Item = BiasRatio> + '_ {
        self.sequences
            .iter()
            .filter(|(_, seqs)| !seqs.is_empty())
            .map(|(ratio, _)| *ratio)
    }

    /// Total sequences across all ratios.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sequences.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_bank_has_sixteen_per_ratio() {
        let bank = SequenceBank::reference();
        for ratio in BiasRatio::ALL {
            assert_eq!(bank.sequences_for(ratio).len(), 16);
        }
        assert_eq!(bank.total(), 32);
    }

    #[test]
    fn reference_tables_hold_only_binary_values() {
        for row in REFERENCE_60.iter().chain(REFERENCE_90.iter()) {
            assert!(row.iter().all(|bit| *bit <= 1), "non-binary row {row:?}");
        }
    }

    #[test]
    fn duplicates_in_the_ninety_bank_are_preserved() {
        let bank = SequenceBank::reference();
        let all_majority = BeadSequence::from_bits([1; BEADS_PER_SEQUENCE]);
        let count = bank
            .sequences_for(BiasRatio::Ninety)
            .iter()
            .filter(|s| **s == all_majority)
            .count();
        assert_eq!(count, 5);
    }

    #[test]
    fn asymmetry_of_front_loaded_sequence() {
        let seq = BeadSequence::from_bits([1, 1, 1, 1, 1, 0, 0, 0]);
        let value = EVIDENCE_WEIGHTS.asymmetry(&seq);
        assert!((value - (-7.5)).abs() < 1e-12);
    }

    #[test]
    fn asymmetry_of_all_majority_is_zero() {
        let seq = BeadSequence::from_bits([1; BEADS_PER_SEQUENCE]);
        assert!(EVIDENCE_WEIGHTS.asymmetry(&seq).abs() < 1e-12);
    }

    #[test]
    fn bead_colour_follows_hidden_box() {
        assert_eq!(Bead::Majority.color(BoxColor::Blue), BoxColor::Blue);
        assert_eq!(Bead::Minority.color(BoxColor::Blue), BoxColor::Green);
    }

    #[test]
    fn delimited_and_counts() {
        let seq = BeadSequence::from_bits([1, 1, 0, 1, 1, 1, 0, 0]);
        assert_eq!(seq.to_delimited(), "1,1,0,1,1,1,0,0");
        assert_eq!(seq.majority_count(), 5);
        assert_eq!(seq.prefix(3).len(), 3);
        assert_eq!(seq.prefix(99).len(), BEADS_PER_SEQUENCE);
    }

    #[test]
    fn missing_ratio_yields_empty_slice() {
        let bank = SequenceBank::default();
        assert!(bank.sequences_for(BiasRatio::Sixty).is_empty());
        assert_eq!(bank.ratios().count(), 0);
    }
}
