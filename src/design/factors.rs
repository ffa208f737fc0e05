//! Trial-level factors: box colours, screen sides, and display modes.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Colour of a box, named after its majority bead colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    Green,
    Blue,
}

impl BoxColor {
    /// Both colours, in left-to-right screen order.
    pub const ALL: [Self; 2] = [Self::Green, Self::Blue];

    /// The complementary colour (the other box's majority colour).
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Green => Self::Blue,
            Self::Blue => Self::Green,
        }
    }

    /// Lowercase name used in exported rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// Screen side the box of this colour is drawn on.
    #[must_use]
    pub const fn side(self) -> BoxSide {
        match self {
            Self::Green => BoxSide::Left,
            Self::Blue => BoxSide::Right,
        }
    }
}

impl fmt::Display for BoxColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Screen side of a box. Continuous ratings measure the right-hand box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxSide {
    Left,
    Right,
}

impl BoxSide {
    /// Colour of the box drawn on this side.
    #[must_use]
    pub const fn color(self) -> BoxColor {
        match self {
            Self::Left => BoxColor::Green,
            Self::Right => BoxColor::Blue,
        }
    }
}

/// How cumulative evidence is shown while the participant rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Bead-by-bead visual record.
    Visual,
    /// Percentage summary of the beads drawn so far.
    Numeric,
}

impl DisplayMode {
    /// Legacy boolean flag (`true` = visual record) kept in the export.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::Visual)
    }

    /// Lowercase name used in logs and plans.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Numeric => "numeric",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
