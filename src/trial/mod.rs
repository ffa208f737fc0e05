//! Trial data and the per-trial elicitation state machine.

pub mod record;
pub mod runner;

pub use record::Trial;
pub use runner::{Halt, TrialKind, TrialOutcome, TrialPhase, TrialRunner};
