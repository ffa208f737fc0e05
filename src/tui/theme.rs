//! Colour tokens and the `NO_COLOR` accessibility hook.

#![allow(missing_docs)]

use std::env;

use crossterm::style::{Color, Stylize};

use crate::design::factors::BoxColor;

/// Color output mode for compatibility with `NO_COLOR` and terminal policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

/// Accessibility knobs consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilityProfile {
    pub color: ColorMode,
}

impl Default for AccessibilityProfile {
    fn default() -> Self {
        Self {
            color: ColorMode::Enabled,
        }
    }
}

impl AccessibilityProfile {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        Self {
            color: if no_color {
                ColorMode::Disabled
            } else {
                ColorMode::Enabled
            },
        }
    }

    #[must_use]
    pub fn from_environment() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some();
        Self::from_no_color_flag(no_color)
    }

    #[must_use]
    pub const fn no_color(self) -> bool {
        matches!(self.color, ColorMode::Disabled)
    }
}

/// Semantic text roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Prompt,
    Emphasis,
    Muted,
}

/// Concrete colours for beads and text roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accessibility: AccessibilityProfile,
    pub green: Color,
    pub blue: Color,
    pub prompt: Color,
    pub emphasis: Color,
    pub muted: Color,
}

impl Theme {
    #[must_use]
    pub const fn new(accessibility: AccessibilityProfile) -> Self {
        Self {
            accessibility,
            green: Color::Green,
            blue: Color::Blue,
            prompt: Color::Yellow,
            emphasis: Color::White,
            muted: Color::DarkGrey,
        }
    }

    #[must_use]
    pub const fn bead_color(&self, color: BoxColor) -> Color {
        match color {
            BoxColor::Green => self.green,
            BoxColor::Blue => self.blue,
        }
    }

    /// One bead glyph: a coloured dot, or the colour's initial without colour.
    #[must_use]
    pub fn bead(&self, color: BoxColor) -> String {
        if self.accessibility.no_color() {
            match color {
                BoxColor::Green => "G".to_string(),
                BoxColor::Blue => "B".to_string(),
            }
        } else {
            "●".with(self.bead_color(color)).to_string()
        }
    }

    /// Empty slot in the visual record.
    #[must_use]
    pub fn empty_slot(&self) -> String {
        if self.accessibility.no_color() {
            ".".to_string()
        } else {
            "○".with(self.muted).to_string()
        }
    }

    /// `text` painted in the colour of `color`'s box.
    #[must_use]
    pub fn tinted(&self, text: &str, color: BoxColor) -> String {
        if self.accessibility.no_color() {
            text.to_string()
        } else {
            text.with(self.bead_color(color)).to_string()
        }
    }

    #[must_use]
    pub fn token(&self, text: &str, token: SemanticToken) -> String {
        if self.accessibility.no_color() {
            return text.to_string();
        }
        match token {
            SemanticToken::Prompt => text.with(self.prompt).to_string(),
            SemanticToken::Emphasis => text.with(self.emphasis).bold().to_string(),
            SemanticToken::Muted => text.with(self.muted).to_string(),
        }
    }
}
