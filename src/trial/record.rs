//! The per-trial data entity filled in while a trial runs.

use serde::Serialize;

use crate::core::errors::{BeadsError, Result};
use crate::design::bank::{BeadSequence, EVIDENCE_WEIGHTS};
use crate::design::factors::{BoxColor, DisplayMode};
use crate::design::ratio::BiasRatio;

/// One elicitation episode.
///
/// Probability estimates are append-only and indexed purely by bead
/// position: `prob_estimates[0]` is the prior, `prob_estimates[i]` the
/// estimate after bead `i`. There is no way to revise or reorder them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trial {
    hidden_color: BoxColor,
    display: DisplayMode,
    ratio: BiasRatio,
    sequence: BeadSequence,
    prob_estimates: Vec<f64>,
    final_choice: Option<BoxColor>,
    evidence_asymmetry: f64,
}

impl Trial {
    /// Fresh trial; evidence asymmetry is computed here and never again.
    #[must_use]
    pub fn new(
        hidden_color: BoxColor,
        display: DisplayMode,
        ratio: BiasRatio,
        sequence: BeadSequence,
    ) -> Self {
        Self {
            hidden_color,
            display,
            ratio,
            sequence,
            prob_estimates: Vec::with_capacity(sequence.len() + 1),
            final_choice: None,
            evidence_asymmetry: EVIDENCE_WEIGHTS.asymmetry(&sequence),
        }
    }

    #[must_use]
    pub const fn hidden_color(&self) -> BoxColor {
        self.hidden_color
    }

    #[must_use]
    pub const fn display(&self) -> DisplayMode {
        self.display
    }

    #[must_use]
    pub const fn ratio(&self) -> BiasRatio {
        self.ratio
    }

    #[must_use]
    pub const fn sequence(&self) -> &BeadSequence {
        &self.sequence
    }

    #[must_use]
    pub fn prob_estimates(&self) -> &[f64] {
        &self.prob_estimates
    }

    #[must_use]
    pub const fn final_choice(&self) -> Option<BoxColor> {
        self.final_choice
    }

    #[must_use]
    pub const fn evidence_asymmetry(&self) -> f64 {
        self.evidence_asymmetry
    }

    /// Number of estimates a completed trial holds (prior + one per bead).
    #[must_use]
    pub const fn expected_estimates(&self) -> usize {
        self.sequence.len() + 1
    }

    /// Bead position the next committed estimate will occupy.
    #[must_use]
    pub fn next_position(&self) -> usize {
        self.prob_estimates.len()
    }

    /// Append the next confirmed estimate.
    ///
    /// Rejects values outside `[0, 1]`, estimates past the last bead, and
    /// estimates after the final choice.
    pub fn record_estimate(&mut self, probability: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(BeadsError::trial_state(format!(
                "probability {probability} outside [0, 1]"
            )));
        }
        if self.final_choice.is_some() {
            return Err(BeadsError::trial_state(
                "estimate recorded after the final choice",
            ));
        }
        if self.prob_estimates.len() >= self.expected_estimates() {
            return Err(BeadsError::trial_state(format!(
                "all {} estimates already recorded",
                self.expected_estimates()
            )));
        }
        self.prob_estimates.push(probability);
        Ok(self.prob_estimates.len() - 1)
    }

    /// Set the final choice; allowed once, after every estimate.
    pub fn record_choice(&mut self, choice: BoxColor) -> Result<()> {
        if let Some(previous) = self.final_choice {
            return Err(BeadsError::trial_state(format!(
                "final choice already set to {previous}"
            )));
        }
        if self.prob_estimates.len() != self.expected_estimates() {
            return Err(BeadsError::trial_state(format!(
                "final choice before all estimates ({} of {})",
                self.prob_estimates.len(),
                self.expected_estimates()
            )));
        }
        self.final_choice = Some(choice);
        Ok(())
    }

    /// Every estimate recorded and the final choice made.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.final_choice.is_some() && self.prob_estimates.len() == self.expected_estimates()
    }

    /// `Some(true)` iff the choice names the hidden box; `None` while unset.
    #[must_use]
    pub fn is_accurate(&self) -> Option<bool> {
        self.final_choice.map(|choice| choice == self.hidden_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trial {
        Trial::new(
            BoxColor::Green,
            DisplayMode::Visual,
            BiasRatio::Sixty,
            BeadSequence::from_bits([1, 1, 1, 1, 1, 0, 0, 0]),
        )
    }

    fn fill(trial: &mut Trial) {
        for p in [0.5, 0.4, 0.35, 0.3, 0.25, 0.4, 0.5, 0.6, 0.55] {
            trial.record_estimate(p).unwrap();
        }
    }

    #[test]
    fn new_trial_is_empty_with_precomputed_asymmetry() {
        let trial = sample();
        assert!(trial.prob_estimates().is_empty());
        assert_eq!(trial.final_choice(), None);
        assert!((trial.evidence_asymmetry() + 7.5).abs() < 1e-12);
        assert!(!trial.is_complete());
    }

    #[test]
    fn estimates_are_positional() {
        let mut trial = sample();
        assert_eq!(trial.record_estimate(0.5).unwrap(), 0);
        assert_eq!(trial.record_estimate(0.3).unwrap(), 1);
        assert_eq!(trial.next_position(), 2);
        assert_eq!(trial.prob_estimates(), &[0.5, 0.3]);
    }

    #[test]
    fn ninth_post_bead_estimate_is_rejected() {
        let mut trial = sample();
        fill(&mut trial);
        let err = trial.record_estimate(0.5).unwrap_err();
        assert_eq!(err.code(), "BDS-2001");
        assert_eq!(trial.prob_estimates().len(), 9);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let mut trial = sample();
        assert!(trial.record_estimate(1.2).is_err());
        assert!(trial.record_estimate(f64::NAN).is_err());
        assert!(trial.prob_estimates().is_empty());
    }

    #[test]
    fn choice_requires_all_estimates_and_is_set_once() {
        let mut trial = sample();
        assert!(trial.record_choice(BoxColor::Green).is_err());
        fill(&mut trial);
        trial.record_choice(BoxColor::Green).unwrap();
        assert!(trial.is_complete());
        assert_eq!(trial.is_accurate(), Some(true));
        assert!(trial.record_choice(BoxColor::Blue).is_err());
        assert_eq!(trial.final_choice(), Some(BoxColor::Green));
        assert!(trial.record_estimate(0.5).is_err());
    }

    #[test]
    fn wrong_choice_is_inaccurate() {
        let mut trial = sample();
        fill(&mut trial);
        trial.record_choice(BoxColor::Blue).unwrap();
        assert_eq!(trial.is_accurate(), Some(false));
    }
}
