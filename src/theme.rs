use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Colours used to draw the typing screen for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub accent: Color,
    pub border: Color,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn toggle(&mut self) {
        *self = self.toggled();
    }

    /// Glyph shown on the theme toggle in the header
    pub fn icon(self) -> &'static str {
        match self {
            ThemeMode::Light => "☀",
            ThemeMode::Dark => "☾",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Light => Palette {
                background: Color::Rgb(250, 250, 250),
                foreground: Color::Rgb(33, 33, 33),
                muted: Color::Rgb(140, 140, 140),
                correct: Color::Rgb(46, 125, 50),
                incorrect: Color::Rgb(198, 40, 40),
                accent: Color::Rgb(21, 101, 192),
                border: Color::Rgb(189, 189, 189),
            },
            ThemeMode::Dark => Palette {
                background: Color::Rgb(18, 18, 18),
                foreground: Color::Rgb(230, 230, 230),
                muted: Color::Rgb(120, 120, 120),
                correct: Color::Rgb(129, 199, 132),
                incorrect: Color::Rgb(239, 83, 80),
                accent: Color::Rgb(144, 202, 249),
                border: Color::Rgb(66, 66, 66),
            },
        }
    }
}
