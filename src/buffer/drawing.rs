//! Box border styles and their glyph tables.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Border style for [`CellBuffer::draw_box`](crate::buffer::CellBuffer::draw_box).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    Single,
    Double,
    Round,
    /// No border; `draw_box` degrades to a plain fill.
    #[default]
    None,
}

/// The six glyphs that make up a box border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderGlyphs {
    /// Single-line box drawing characters.
    pub const SINGLE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// Double-line box drawing characters.
    pub const DOUBLE: Self = Self {
        top_left: '╔',
        top_right: '╗',
        bottom_left: '╚',
        bottom_right: '╝',
        horizontal: '═',
        vertical: '║',
    };

    /// Rounded corner box drawing characters.
    pub const ROUND: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Whether `c` is one of this table's glyphs.
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
            self.horizontal,
            self.vertical,
        ]
        .contains(&c)
    }
}

impl BorderStyle {
    /// Glyph table, or `None` for [`BorderStyle::None`].
    #[must_use]
    pub const fn glyphs(self) -> Option<BorderGlyphs> {
        match self {
            Self::Single => Some(BorderGlyphs::SINGLE),
            Self::Double => Some(BorderGlyphs::DOUBLE),
            Self::Round => Some(BorderGlyphs::ROUND),
            Self::None => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Round => "round",
            Self::None => "none",
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BorderStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "round" | "rounded" => Ok(Self::Round),
            "none" => Ok(Self::None),
            other => Err(Error::InvalidProperty {
                name: "borderStyle".to_string(),
                value: other.to_string(),
            }),
        }
    }
}
