//! Bias ratios: the closed set of majority/minority box compositions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Majority/minority bead split of both boxes in a trial.
///
/// Serialized as the majority percentage (`60`, `90`) so design tables and
/// exported rows stay readable by the analysis scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BiasRatio {
    /// 60 majority-colour beads, 40 minority-colour beads.
    Sixty,
    /// 90 majority-colour beads, 10 minority-colour beads.
    Ninety,
}

impl BiasRatio {
    /// Every ratio, in declaration order.
    pub const ALL: [Self; 2] = [Self::Sixty, Self::Ninety];

    /// `(majority_percent, minority_percent)`; always sums to 100.
    #[must_use]
    pub const fn split(self) -> (u8, u8) {
        match self {
            Self::Sixty => (60, 40),
            Self::Ninety => (90, 10),
        }
    }

    /// Majority percentage, the ratio's key in design tables.
    #[must_use]
    pub const fn majority_percent(self) -> u8 {
        self.split().0
    }

    /// Minority percentage.
    #[must_use]
    pub const fn minority_percent(self) -> u8 {
        self.split().1
    }

    /// Probability of drawing a majority-colour bead from the source box.
    #[must_use]
    pub fn majority_probability(self) -> f64 {
        f64::from(self.majority_percent()) / 100.0
    }

    /// Resolve a majority percentage to a ratio.
    #[must_use]
    pub const fn from_majority_percent(percent: u8) -> Option<Self> {
        match percent {
            60 => Some(Self::Sixty),
            90 => Some(Self::Ninety),
            _ => None,
        }
    }
}

impl TryFrom<u8> for BiasRatio {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_majority_percent(value)
            .ok_or_else(|| format!("unknown bias ratio {value}; expected 60 or 90"))
    }
}

impl From<BiasRatio> for u8 {
    fn from(value: BiasRatio) -> Self {
        value.majority_percent()
    }
}

impl fmt::Display for BiasRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.majority_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sum_to_one_hundred() {
        for ratio in BiasRatio::ALL {
            let (major, minor) = ratio.split();
            assert_eq!(u16::from(major) + u16::from(minor), 100);
            assert!(major > minor);
        }
    }

    #[test]
    fn serde_uses_majority_percent() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            order: Vec<BiasRatio>,
        }
        let holder: Holder = toml::from_str("order = [60, 90, 60, 90]").unwrap();
        assert_eq!(
            holder.order,
            vec![
                BiasRatio::Sixty,
                BiasRatio::Ninety,
                BiasRatio::Sixty,
                BiasRatio::Ninety
            ]
        );
        let text = toml::to_string(&holder).unwrap();
        assert!(text.contains("60"));
    }

    #[test]
    fn unknown_percent_is_rejected() {
        let parsed: Result<Vec<BiasRatio>, _> = serde_json::from_str("[75]");
        assert!(parsed.is_err());
        assert_eq!(BiasRatio::from_majority_percent(75), None);
    }
}
