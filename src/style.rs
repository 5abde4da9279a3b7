//! Per-cell text attributes.
//!
//! - [`TextAttributes`]: bitflags for bold, italic, underline, strikethrough
//! - [`CellStyle`]: a partial update where `None` leaves a flag untouched

use bitflags::bitflags;

bitflags! {
    /// Text rendering attributes.
    ///
    /// `STRIKETHROUGH` is stored and copied like the others but does not take
    /// part in frame diffing or SGR output.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u8 {
        /// Bold/increased intensity.
        const BOLD          = 0x01;
        /// Italic.
        const ITALIC        = 0x02;
        /// Underlined text.
        const UNDERLINE     = 0x04;
        /// Strikethrough text.
        const STRIKETHROUGH = 0x08;
    }
}

impl TextAttributes {
    /// Attributes that participate in frame diffing.
    pub const DIFFED: Self = Self::BOLD.union(Self::ITALIC).union(Self::UNDERLINE);

    /// Only the attributes compared between frames.
    #[must_use]
    pub const fn diffed(self) -> Self {
        self.intersection(Self::DIFFED)
    }
}

/// Partial attribute update for [`CellBuffer::set_cell_style`].
///
/// [`CellBuffer::set_cell_style`]: crate::buffer::CellBuffer::set_cell_style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
}

impl CellStyle {
    /// No changes.
    pub const NONE: Self = Self {
        bold: None,
        italic: None,
        underline: None,
        strikethrough: None,
    };

    #[must_use]
    pub const fn bold(mut self, on: bool) -> Self {
        self.bold = Some(on);
        self
    }

    #[must_use]
    pub const fn italic(mut self, on: bool) -> Self {
        self.italic = Some(on);
        self
    }

    #[must_use]
    pub const fn underline(mut self, on: bool) -> Self {
        self.underline = Some(on);
        self
    }

    #[must_use]
    pub const fn strikethrough(mut self, on: bool) -> Self {
        self.strikethrough = Some(on);
        self
    }

    /// Set every flag from a full attribute set.
    #[must_use]
    pub const fn from_attributes(attrs: TextAttributes) -> Self {
        Self {
            bold: Some(attrs.contains(TextAttributes::BOLD)),
            italic: Some(attrs.contains(TextAttributes::ITALIC)),
            underline: Some(attrs.contains(TextAttributes::UNDERLINE)),
            strikethrough: Some(attrs.contains(TextAttributes::STRIKETHROUGH)),
        }
    }

    /// Apply the specified flags onto `attrs`.
    #[must_use]
    pub fn apply(self, mut attrs: TextAttributes) -> TextAttributes {
        let updates = [
            (self.bold, TextAttributes::BOLD),
            (self.italic, TextAttributes::ITALIC),
            (self.underline, TextAttributes::UNDERLINE),
            (self.strikethrough, TextAttributes::STRIKETHROUGH),
        ];
        for (value, flag) in updates {
            if let Some(on) = value {
                attrs.set(flag, on);
            }
        }
        attrs
    }
}
