//! BDS-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, BeadsError>;

/// Top-level error type for the beads task.
///
/// The participant pressing Esc is not represented here; that path flows
/// through [`crate::present::Aborted`] and is a normal session exit.
#[derive(Debug, Error)]
pub enum BeadsError {
    #[error("[BDS-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[BDS-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[BDS-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[BDS-1101] invalid trial design: {details}")]
    InvalidDesign { details: String },

    #[error("[BDS-1102] invalid subject identifier {subject:?}: {reason}")]
    InvalidSubject { subject: String, reason: String },

    #[error("[BDS-2001] illegal trial state transition: {details}")]
    TrialState { details: String },

    #[error("[BDS-2002] results already flushed to {path}")]
    AlreadyFlushed { path: PathBuf },

    #[error("[BDS-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[BDS-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[BDS-3003] terminal failure: {details}")]
    Terminal { details: String },
}

impl BeadsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "BDS-1001",
            Self::MissingConfig { .. } => "BDS-1002",
            Self::ConfigParse { .. } => "BDS-1003",
            Self::InvalidDesign { .. } => "BDS-1101",
            Self::InvalidSubject { .. } => "BDS-1102",
            Self::TrialState { .. } => "BDS-2001",
            Self::AlreadyFlushed { .. } => "BDS-2002",
            Self::Serialization { .. } => "BDS-2101",
            Self::Io { .. } => "BDS-3002",
            Self::Terminal { .. } => "BDS-3003",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Terminal { .. })
    }

    /// Whether the error was raised before any trial could be generated.
    #[must_use]
    pub const fn is_pre_session(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidDesign { .. }
                | Self::InvalidSubject { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for design (counterbalancing) failures.
    #[must_use]
    pub fn design(details: impl Into<String>) -> Self {
        Self::InvalidDesign {
            details: details.into(),
        }
    }

    /// Convenience constructor for illegal trial mutations.
    #[must_use]
    pub fn trial_state(details: impl Into<String>) -> Self {
        Self::TrialState {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for BeadsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for BeadsError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for BeadsError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
