//! Session configuration: design factors, timings, and output paths.
//!
//! Every section defaults to the reference experiment, so an absent config
//! file runs the standard 64-trial session.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{BeadsError, Result};
use crate::design::bank::SequenceBank;
use crate::design::factors::DisplayMode;
use crate::design::factory::TrialFactory;
use crate::design::ratio::BiasRatio;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub design: DesignConfig,
    pub timing: TimingConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Ratio of each block within one display mode.
    pub block_order: Vec<BiasRatio>,
    /// Display mode of each super-block, in session order.
    pub display_order: Vec<DisplayMode>,
    pub trials_per_block: usize,
    /// Run the practice trials before the main blocks.
    pub practice: bool,
    /// Fixed RNG seed; `None` draws one from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            block_order: vec![
                BiasRatio::Sixty,
                BiasRatio::Ninety,
                BiasRatio::Sixty,
                BiasRatio::Ninety,
            ],
            display_order: vec![DisplayMode::Visual, DisplayMode::Numeric],
            trials_per_block: 8,
            practice: true,
            seed: None,
        }
    }
}

/// Fixed waits, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub intro_dwell: f64,
    pub layout_transition: f64,
    pub bead_reveal: f64,
    pub bead_hold: f64,
    pub choice_feedback: f64,
    pub inter_trial: f64,
    pub practice_banner: f64,
    pub practice_outro: f64,
    pub rest: f64,
    pub get_ready: f64,
    pub farewell: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            intro_dwell: 3.0,
            layout_transition: 0.5,
            bead_reveal: 0.8,
            bead_hold: 0.3,
            choice_feedback: 0.3,
            inter_trial: 0.5,
            practice_banner: 1.5,
            practice_outro: 2.0,
            rest: 60.0,
            get_ready: 5.0,
            farewell: 2.0,
        }
    }
}

impl TimingConfig {
    /// Convert a validated seconds value; anything unrepresentable is zero.
    #[must_use]
    pub fn span(seconds: f64) -> Duration {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO)
    }

    fn named_values(&self) -> [(&'static str, f64); 11] {
        [
            ("intro_dwell", self.intro_dwell),
            ("layout_transition", self.layout_transition),
            ("bead_reveal", self.bead_reveal),
            ("bead_hold", self.bead_hold),
            ("choice_feedback", self.choice_feedback),
            ("inter_trial", self.inter_trial),
            ("practice_banner", self.practice_banner),
            ("practice_outro", self.practice_outro),
            ("rest", self.rest),
            ("get_ready", self.get_ready),
            ("farewell", self.farewell),
        ]
    }

    /// Every wait set to zero; used by headless runs.
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            intro_dwell: 0.0,
            layout_transition: 0.0,
            bead_reveal: 0.0,
            bead_hold: 0.0,
            choice_feedback: 0.0,
            inter_trial: 0.0,
            practice_banner: 0.0,
            practice_outro: 0.0,
            rest: 0.0,
            get_ready: 0.0,
            farewell: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub output_dir: PathBuf,
    pub results_prefix: String,
    /// Explicit JSONL event log; defaults to one per subject in `output_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_log: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            results_prefix: "beads_task_results".to_string(),
            event_log: None,
        }
    }
}

impl PathsConfig {
    /// `<output_dir>/<prefix>_<subject>.csv`
    #[must_use]
    pub fn results_path(&self, subject: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{subject}.csv", self.results_prefix))
    }

    /// Explicit event log, or `<output_dir>/beads_task_events_<subject>.jsonl`.
    #[must_use]
    pub fn event_log_path(&self, subject: &str) -> PathBuf {
        self.event_log.clone().unwrap_or_else(|| {
            self.output_dir
                .join(format!("beads_task_events_{subject}.jsonl"))
        })
    }
}

impl Config {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(BeadsError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| BeadsError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values no session could run with.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.timing.named_values() {
            if !value.is_finite() || value < 0.0 {
                return Err(BeadsError::InvalidConfig {
                    details: format!(
                        "timing.{name} must be a finite, non-negative number of seconds (got {value})"
                    ),
                });
            }
        }
        if self.design.trials_per_block == 0 {
            return Err(BeadsError::InvalidConfig {
                details: "design.trials_per_block must be at least 1".to_string(),
            });
        }
        if self.design.display_order.is_empty() {
            return Err(BeadsError::InvalidConfig {
                details: "design.display_order must name at least one display mode".to_string(),
            });
        }
        let distinct: HashSet<DisplayMode> = self.design.display_order.iter().copied().collect();
        if distinct.len() != self.design.display_order.len() {
            return Err(BeadsError::InvalidConfig {
                details: "design.display_order repeats a display mode".to_string(),
            });
        }
        if self.paths.results_prefix.is_empty()
            || self.paths.results_prefix.contains(['/', '\\'])
        {
            return Err(BeadsError::InvalidConfig {
                details: "paths.results_prefix must be a plain, non-empty file name prefix"
                    .to_string(),
            });
        }
        TrialFactory::new(&SequenceBank::reference()).chunk_layout(&self.design.block_order)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn display_mode_repeated_anywhere_is_rejected() {
        for order in [
            r#"["visual", "numeric", "visual"]"#,
            r#"["numeric", "visual", "numeric"]"#,
            r#"["visual", "visual"]"#,
        ] {
            let err = Config::from_toml_str(&format!("[design]\ndisplay_order = {order}\n"))
                .unwrap_err();
            assert_eq!(err.code(), "BDS-1001", "{order}");
        }
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [design]
            display_order = ["numeric", "visual"]
            seed = 42

            [timing]
            rest = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(config.design.display_order[0], DisplayMode::Numeric);
        assert_eq!(config.design.seed, Some(42));
        assert_eq!(config.design.trials_per_block, 8);
        assert!((config.timing.rest - 30.0).abs() < f64::EPSILON);
        assert!((config.timing.intro_dwell - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_timing_is_rejected() {
        let err = Config::from_toml_str("[timing]\nrest = -1.0\n").unwrap_err();
        assert_eq!(err.code(), "BDS-1001");
        assert!(err.to_string().contains("timing.rest"));
    }

    #[test]
    fn single_ratio_block_order_is_a_design_error() {
        let err = Config::from_toml_str("[design]\nblock_order = [60, 60, 60, 60]\n").unwrap_err();
        assert_eq!(err.code(), "BDS-1101");
    }

    #[test]
    fn unknown_ratio_is_a_parse_error() {
        let err = Config::from_toml_str("[design]\nblock_order = [60, 75, 60, 75]\n").unwrap_err();
        assert_eq!(err.code(), "BDS-1003");
    }


    #[test]
    fn missing_file_is_reported() {
        let err = Config::load(Some(Path::new("/nonexistent/beads.toml"))).unwrap_err();
        assert_eq!(err.code(), "BDS-1002");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("beads.toml");
        std::fs::write(&path, "[design]\ntrials_per_block = 4\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.design.trials_per_block, 4);
    }

    #[test]
    fn toml_round_trip_preserves_design() {
        let mut config = Config::default();
        config.design.seed = Some(7);
        let text = config.to_toml_string().unwrap();
        let back = Config::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn paths_are_built_from_subject() {
        let paths = PathsConfig {
            output_dir: PathBuf::from("/data/beads"),
            ..PathsConfig::default()
        };
        assert_eq!(
            paths.results_path("S01"),
            PathBuf::from("/data/beads/beads_task_results_S01.csv")
        );
        assert_eq!(
            paths.event_log_path("S01"),
            PathBuf::from("/data/beads/beads_task_events_S01.jsonl")
        );
    }

    #[test]
    fn span_never_panics() {
        assert_eq!(TimingConfig::span(-1.0), Duration::ZERO);
        assert_eq!(TimingConfig::span(0.5), Duration::from_millis(500));
    }
}
