//! Beads task: a sequential-sampling probabilistic-reasoning experiment.
//!
//! The library holds the headless core (counterbalanced trial design, the
//! per-trial elicitation state machine, block scheduling, export, and the
//! event log) behind the [`present::Presentation`] seam. The terminal
//! presenter lives behind the `tui` feature, the `beads` binary behind `cli`.

pub mod core;
pub mod design;
pub mod export;
pub mod logger;
pub mod present;
pub mod session;
pub mod trial;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cli_app;
