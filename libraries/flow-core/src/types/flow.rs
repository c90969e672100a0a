/// Flow color categories and their display palettes
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six fixed color categories used to tag and filter media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKey {
    /// Energy, focus
    Red,
    /// Creativity, good mood
    Orange,
    /// Calm, relaxation
    Blue,
    /// Reflection, night
    Purple,
    /// Intensity, classics
    Black,
    /// Lightness, fun
    Pink,
}

/// Display palette attached to a Flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowPalette {
    /// Accent color used for active controls
    pub primary: &'static str,
    /// Secondary accent
    pub primary_alt: &'static str,
    /// Screen background
    pub background: &'static str,
    /// Foreground text color
    pub text: &'static str,
    /// Whether the palette is a dark theme
    pub is_dark: bool,
}

const fn light(primary: &'static str, primary_alt: &'static str) -> FlowPalette {
    FlowPalette {
        primary,
        primary_alt,
        background: "#F5F5F5",
        text: "#111",
        is_dark: false,
    }
}

const RED: FlowPalette = light("#E53935", "#FF5252");
const ORANGE: FlowPalette = light("#FB8C00", "#FFB74D");
const BLUE: FlowPalette = light("#1E88E5", "#64B5F6");
const PURPLE: FlowPalette = light("#8E24AA", "#BA68C8");
const PINK: FlowPalette = light("#D81B60", "#F48FB1");
const BLACK: FlowPalette = FlowPalette {
    primary: "#1F1F1F",
    primary_alt: "#00E5FF",
    background: "#121212",
    text: "#FFF",
    is_dark: true,
};

impl FlowKey {
    /// Every Flow, in display order
    pub const ALL: [FlowKey; 6] = [
        FlowKey::Red,
        FlowKey::Orange,
        FlowKey::Blue,
        FlowKey::Purple,
        FlowKey::Black,
        FlowKey::Pink,
    ];

    /// Storage/wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Black => "black",
            Self::Pink => "pink",
        }
    }

    /// Human-readable label with the mood the Flow stands for
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "Red (Energy, Focus)",
            Self::Orange => "Orange (Creativity, Good Mood)",
            Self::Blue => "Blue (Calm, Relaxation)",
            Self::Purple => "Purple (Reflection, Night)",
            Self::Black => "Black (Intensity, Classics)",
            Self::Pink => "Pink (Lightness, Fun)",
        }
    }

    /// Look up the display palette for this Flow
    #[must_use]
    pub fn palette(&self) -> &'static FlowPalette {
        match self {
            Self::Red => &RED,
            Self::Orange => &ORANGE,
            Self::Blue => &BLUE,
            Self::Purple => &PURPLE,
            Self::Black => &BLACK,
            Self::Pink => &PINK,
        }
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FlowKey {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|flow| flow.as_str() == normalized)
            .ok_or_else(|| FlowError::UnknownFlow(s.to_string()))
    }
}
