//! Event payloads written to the session log.

#![allow(missing_docs)]

use std::path::PathBuf;

use serde::Serialize;

use crate::design::factors::{BoxColor, DisplayMode};
use crate::design::ratio::BiasRatio;
use crate::present::RestKind;
use crate::session::Stage;
use crate::trial::runner::{TrialKind, TrialPhase};

/// One structured log event, tagged by `event` in the JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        subject: String,
        seed: u64,
        fingerprint: String,
        main_trials: usize,
        practice_trials: usize,
    },
    TrialStarted {
        kind: TrialKind,
        /// 1-based position within its list.
        index: usize,
        ratio: BiasRatio,
        display: DisplayMode,
        hidden_color: BoxColor,
    },
    EstimateCommitted {
        kind: TrialKind,
        index: usize,
        position: usize,
        value: f64,
    },
    ChoiceCommitted {
        kind: TrialKind,
        index: usize,
        choice: BoxColor,
        accurate: bool,
    },
    TrialCommitted {
        /// 1-based position in the results collection.
        result_index: usize,
    },
    RestStarted {
        after_block: usize,
        kind: RestKind,
        seconds: f64,
    },
    SessionAborted {
        stage: Stage,
        #[serde(skip_serializing_if = "Option::is_none")]
        phase: Option<TrialPhase>,
        committed: usize,
    },
    ResultsFlushed {
        path: PathBuf,
        rows: usize,
    },
    ResultsFlushFailed {
        path: PathBuf,
        error: String,
    },
    SessionCompleted {
        committed: usize,
    },
}

impl SessionEvent {
    /// The `event` tag, for filtering without serializing.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::TrialStarted { .. } => "trial_started",
            Self::EstimateCommitted { .. } => "estimate_committed",
            Self::ChoiceCommitted { .. } => "choice_committed",
            Self::TrialCommitted { .. } => "trial_committed",
            Self::RestStarted { .. } => "rest_started",
            Self::SessionAborted { .. } => "session_aborted",
            Self::ResultsFlushed { .. } => "results_flushed",
            Self::ResultsFlushFailed { .. } => "results_flush_failed",
            Self::SessionCompleted { .. } => "session_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_matches_name() {
        let event = SessionEvent::EstimateCommitted {
            kind: TrialKind::Main,
            index: 3,
            position: 0,
            value: 0.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["kind"], "main");
        assert_eq!(json["position"], 0);
    }

    #[test]
    fn abort_without_phase_omits_field() {
        let event = SessionEvent::SessionAborted {
            stage: Stage::Rest,
            phase: None,
            committed: 8,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("phase").is_none());
        assert_eq!(json["stage"], "rest");
    }
}
