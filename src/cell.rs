//! Terminal cell type representing a single character position.
//!
//! A frame is a grid of cells. Each cell holds one grapheme cluster along
//! with its foreground/background colors and text attributes.
//!
//! # Examples
//!
//! ```
//! use termscene::{Cell, Rgba};
//!
//! let cell = Cell::default();
//! assert_eq!(cell.content.to_string(), " ");
//! assert_eq!(cell.fg, Rgba::WHITE);
//! assert!(cell.bg.is_transparent());
//!
//! let emoji = Cell::from_grapheme("👍", Rgba::WHITE, Rgba::BLACK);
//! assert_eq!(emoji.content.to_string(), "👍");
//! ```

use crate::color::Rgba;
use crate::style::TextAttributes;
use std::fmt;
use std::io::{self, Write};

/// Content of a terminal cell.
///
/// Single code points are stored inline; multi-codepoint clusters (ZWJ
/// sequences, combining marks) are boxed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellContent {
    Char(char),
    Grapheme(Box<str>),
}

impl CellContent {
    /// Build content from one grapheme cluster.
    #[must_use]
    pub fn from_grapheme(s: &str) -> Self {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::Char(c),
            (None, _) => Self::Char(' '),
            _ => Self::Grapheme(s.into()),
        }
    }

    /// Check if this is the blank space glyph.
    #[must_use]
    pub fn is_space(&self) -> bool {
        matches!(self, Self::Char(' '))
    }

    /// Get the character if this is a single char.
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            Self::Grapheme(_) => None,
        }
    }

    /// Display width in terminal columns.
    #[must_use]
    pub fn display_width(&self) -> usize {
        match self {
            Self::Char(c) => unicode_width::UnicodeWidthChar::width(*c).unwrap_or(0),
            Self::Grapheme(s) => unicode_width::UnicodeWidthStr::width(&**s),
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Grapheme(s) => f.write_str(s),
        }
    }
}

impl Default for CellContent {
    fn default() -> Self {
        Self::Char(' ')
    }
}

/// A single terminal cell with content and styling.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// The character or grapheme content.
    pub content: CellContent,
    /// Foreground color.
    pub fg: Rgba,
    /// Background color.
    pub bg: Rgba,
    /// Text rendering attributes.
    pub attributes: TextAttributes,
}

impl Default for Cell {
    /// A space with opaque white foreground over a transparent background.
    fn default() -> Self {
        Self::blank(Rgba::TRANSPARENT)
    }
}

impl Cell {
    /// Create a new cell with a single character and no attributes.
    #[must_use]
    pub fn new(ch: char, fg: Rgba, bg: Rgba) -> Self {
        Self {
            content: CellContent::Char(ch),
            fg,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// Create a cell from a grapheme cluster string.
    #[must_use]
    pub fn from_grapheme(s: &str, fg: Rgba, bg: Rgba) -> Self {
        Self {
            content: CellContent::from_grapheme(s),
            fg,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    /// The default glyph and style over the given background.
    #[must_use]
    pub fn blank(bg: Rgba) -> Self {
        Self {
            content: CellContent::Char(' '),
            fg: Rgba::WHITE,
            bg,
            attributes: TextAttributes::empty(),
        }
    }

    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.attributes.contains(TextAttributes::BOLD)
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.attributes.contains(TextAttributes::ITALIC)
    }

    #[must_use]
    pub fn is_underline(&self) -> bool {
        self.attributes.contains(TextAttributes::UNDERLINE)
    }

    #[must_use]
    pub fn is_strikethrough(&self) -> bool {
        self.attributes.contains(TextAttributes::STRIKETHROUGH)
    }

    /// Equality as seen by the frame differ.
    ///
    /// Compares glyph, colors, bold, italic and underline. Strikethrough is
    /// not compared.
    #[must_use]
    pub fn diff_eq(&self, other: &Cell) -> bool {
        self.content == other.content
            && self.fg == other.fg
            && self.bg == other.bg
            && self.attributes.diffed() == other.attributes.diffed()
    }

    /// Sparse-copy test used by buffer blits: a space over a transparent
    /// background carries nothing.
    #[must_use]
    pub fn is_see_through(&self) -> bool {
        self.bg.is_transparent() && self.content.is_space()
    }

    /// Write the glyph to a writer.
    pub fn write_content<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match &self.content {
            CellContent::Char(c) => {
                let mut buf = [0u8; 4];
                w.write_all(c.encode_utf8(&mut buf).as_bytes())
            }
            CellContent::Grapheme(s) => w.write_all(s.as_bytes()),
        }
    }
}
