//! Experimental design: ratios, trial factors, the sequence bank, and the
//! counterbalanced trial factory.

pub mod bank;
pub mod factors;
pub mod factory;
pub mod ratio;

pub use bank::{BEADS_PER_SEQUENCE, Bead, BeadSequence, EVIDENCE_WEIGHTS, SequenceBank};
pub use factors::{BoxColor, BoxSide, DisplayMode};
pub use factory::{TrialFactory, design_fingerprint};
pub use ratio::BiasRatio;
