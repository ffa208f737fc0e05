//! Flattening committed trials into analysis rows.
//!
//! One row per (trial, bead position): position 0 carries the prior, 1..=8
//! the post-bead estimates. Trial-level fields repeat on every row. The same
//! function serves normal completion and the abort path.

#![allow(missing_docs)]

pub mod table;

use serde::Serialize;

use crate::design::factors::{BoxColor, DisplayMode};
use crate::design::ratio::BiasRatio;
use crate::trial::record::Trial;

pub use table::{COLUMNS, write_csv, write_results_file};

/// One exported row, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub subject: String,
    /// 1-based index in completion order.
    pub trial: usize,
    pub hidden_color: BoxColor,
    pub display: DisplayMode,
    pub ratio: BiasRatio,
    pub bead_position: usize,
    /// Comma-delimited bits.
    pub sequence: String,
    pub majority_beads: usize,
    pub prob_estimate: f64,
    pub final_choice: BoxColor,
    pub evidence_asymmetry: f64,
    /// `1` iff the final choice names the hidden box.
    pub accuracy: u8,
}

/// Rows for every completed trial in `results`, in order.
///
/// Incomplete trials never appear; they cannot reach `results` through the
/// session, and are skipped here as well.
#[must_use]
pub fn export(results: &[Trial], subject: &str) -> Vec<ExportRow> {
    results
        .iter()
        .filter(|t| t.is_complete())
        .enumerate()
        .flat_map(|(i, trial)| trial_rows(trial, i + 1, subject))
        .collect()
}

fn trial_rows(trial: &Trial, number: usize, subject: &str) -> Vec<ExportRow> {
    let Some(final_choice) = trial.final_choice() else {
        return Vec::new();
    };
    let sequence = trial.sequence().to_delimited();
    let majority_beads = trial.sequence().majority_count();
    let accuracy = u8::from(final_choice == trial.hidden_color());
    trial
        .prob_estimates()
        .iter()
        .enumerate()
        .map(|(bead_position, estimate)| ExportRow {
            subject: subject.to_string(),
            trial: number,
            hidden_color: trial.hidden_color(),
            display: trial.display(),
            ratio: trial.ratio(),
            bead_position,
            sequence: sequence.clone(),
            majority_beads,
            prob_estimate: *estimate,
            final_choice,
            evidence_asymmetry: trial.evidence_asymmetry(),
            accuracy,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::bank::{BeadSequence, EVIDENCE_WEIGHTS};

    fn completed(hidden: BoxColor, choice: BoxColor, bits: [u8; 8]) -> Trial {
        let mut trial = Trial::new(
            hidden,
            DisplayMode::Visual,
            BiasRatio::Sixty,
            BeadSequence::from_bits(bits),
        );
        for p in [0.5, 0.45, 0.4, 0.5, 0.55, 0.6, 0.65, 0.6, 0.7] {
            trial.record_estimate(p).unwrap();
        }
        trial.record_choice(choice).unwrap();
        trial
    }

    #[test]
    fn nine_rows_per_trial_with_positions_ascending() {
        let rows = export(
            &[completed(BoxColor::Green, BoxColor::Green, [1, 1, 1, 1, 1, 0, 0, 0])],
            "S01",
        );
        assert_eq!(rows.len(), 9);
        let positions: Vec<usize> = rows.iter().map(|r| r.bead_position).collect();
        assert_eq!(positions, (0..=8).collect::<Vec<_>>());
        assert!(rows.iter().all(|r| r.trial == 1 && r.subject == "S01"));
        assert!((rows[0].prob_estimate - 0.5).abs() < 1e-12);
        assert!((rows[8].prob_estimate - 0.7).abs() < 1e-12);
        assert_eq!(rows[0].sequence, "1,1,1,1,1,0,0,0");
        assert_eq!(rows[0].majority_beads, 5);
    }

    #[test]
    fn accuracy_is_shared_across_a_trials_rows() {
        let rows = export(
            &[
                completed(BoxColor::Green, BoxColor::Green, [1; 8]),
                completed(BoxColor::Blue, BoxColor::Green, [0, 1, 1, 1, 1, 1, 1, 1]),
            ],
            "S02",
        );
        assert_eq!(rows.len(), 18);
        assert!(rows[..9].iter().all(|r| r.accuracy == 1));
        assert!(rows[9..].iter().all(|r| r.accuracy == 0 && r.trial == 2));
    }

    #[test]
    fn asymmetry_reproduces_from_exported_sequence() {
        let rows = export(
            &[completed(BoxColor::Blue, BoxColor::Blue, [0, 0, 1, 1, 1, 0, 1, 1])],
            "S03",
        );
        let bits: Vec<u8> = rows[0]
            .sequence
            .split(',')
            .map(|b| b.parse().unwrap())
            .collect();
        let arr: [u8; 8] = bits.try_into().unwrap();
        let recomputed = EVIDENCE_WEIGHTS.asymmetry(&BeadSequence::from_bits(arr));
        assert!((recomputed - rows[0].evidence_asymmetry).abs() < 1e-9);
    }

    #[test]
    fn incomplete_trials_are_skipped() {
        let mut partial = Trial::new(
            BoxColor::Blue,
            DisplayMode::Numeric,
            BiasRatio::Ninety,
            BeadSequence::from_bits([1; 8]),
        );
        partial.record_estimate(0.5).unwrap();
        let rows = export(
            &[
                partial,
                completed(BoxColor::Green, BoxColor::Blue, [1; 8]),
            ],
            "S04",
        );
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].trial, 1);
    }

    #[test]
    fn empty_results_export_nothing() {
        assert!(export(&[], "S05").is_empty());
    }
}
