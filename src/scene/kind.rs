//! Node kinds and their paint routines.

use crate::buffer::{BorderStyle, CellBuffer};
use crate::color::Rgba;
use crate::style::CellStyle;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Paint properties of a box node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxProps {
    pub border_style: BorderStyle,
    pub border_color: Option<Rgba>,
    pub background_color: Option<Rgba>,
}

impl BoxProps {
    #[must_use]
    pub fn border(mut self, style: BorderStyle, color: Option<Rgba>) -> Self {
        self.border_style = style;
        self.border_color = color;
        self
    }

    #[must_use]
    pub fn background(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }
}

/// Paint properties of a text node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextProps {
    pub content: String,
    pub color: Option<Rgba>,
    pub background_color: Option<Rgba>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Created by the reconciler for a bare literal rather than by a `text`
    /// element. Only literal nodes accept in-place text replacement.
    pub literal: bool,
}

impl TextProps {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// A reconciler-owned text node holding `content`.
    #[must_use]
    pub fn literal(content: impl Into<String>) -> Self {
        Self {
            literal: true,
            ..Self::new(content)
        }
    }

    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Intrinsic size: widest line in columns by number of lines.
    #[must_use]
    pub fn measure(&self) -> (f32, f32) {
        if self.content.is_empty() {
            return (0.0, 0.0);
        }
        let (width, lines) = self
            .content
            .split('\n')
            .fold((0, 0), |(w, n), line| (w.max(line.width()), n + 1));
        (width as f32, lines as f32)
    }

    fn style_overlay(&self) -> Option<CellStyle> {
        (self.bold || self.italic || self.underline).then(|| {
            CellStyle::NONE
                .bold(self.bold)
                .italic(self.italic)
                .underline(self.underline)
        })
    }
}

/// What a scene node is, and therefore how it paints.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// The graph root. Paints nothing.
    Root,
    Box(BoxProps),
    Text(TextProps),
}

impl NodeKind {
    /// Short kind name (`root`, `box`, `text`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Box(_) => "box",
            Self::Text(_) => "text",
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&TextProps> {
        match self {
            Self::Text(props) => Some(props),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_box(&self) -> Option<&BoxProps> {
        match self {
            Self::Box(props) => Some(props),
            _ => None,
        }
    }

    /// Paint this node's own content at its computed box.
    pub fn paint(&self, buffer: &mut CellBuffer, x: i32, y: i32, width: u32, height: u32) {
        match self {
            Self::Root => {}
            Self::Box(props) => {
                if props.border_style == BorderStyle::None && props.background_color.is_none() {
                    return;
                }
                buffer.draw_box(
                    x,
                    y,
                    width as i32,
                    height as i32,
                    props.border_style,
                    props.border_color,
                    props.background_color,
                );
            }
            Self::Text(props) => {
                let overlay = props.style_overlay();
                for (row, line) in props.content.split('\n').enumerate() {
                    let line_y = y.saturating_add(row as i32);
                    buffer.draw_text(x, line_y, line, props.color, props.background_color);
                    if let Some(style) = overlay {
                        for col in 0..line.graphemes(true).count() {
                            buffer.set_cell_style(x + col as i32, line_y, style);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)] // Exact float comparison is intentional in tests
    use super::*;

    #[test]
    fn test_text_measure() {
        assert_eq!(TextProps::new("").measure(), (0.0, 0.0));
        assert_eq!(TextProps::new("abc").measure(), (3.0, 1.0));
        assert_eq!(TextProps::new("a\nlonger\nmid").measure(), (6.0, 3.0));
        assert_eq!(TextProps::new("日本").measure(), (4.0, 1.0));
    }

    #[test]
    fn test_text_paints_lines_with_style() {
        let mut buf = CellBuffer::new(8, 3);
        let mut props = TextProps::new("ab\ncd").color(Rgba::RED);
        props.underline = true;
        NodeKind::Text(props).paint(&mut buf, 1, 0, 1, 1);

        assert_eq!(buf.row_text(0), " ab     ");
        assert_eq!(buf.row_text(1), " cd     ");
        let cell = buf.get_cell(2, 1).unwrap();
        assert_eq!(cell.fg, Rgba::RED);
        assert!(cell.is_underline());
        assert!(!cell.is_bold());
        // Style only covers the text itself
        assert!(!buf.get_cell(3, 1).unwrap().is_underline());
    }

    #[test]
    fn test_plain_box_paints_nothing() {
        let mut buf = CellBuffer::new(4, 4);
        let before = buf.clone();
        NodeKind::Box(BoxProps::default()).paint(&mut buf, 0, 0, 4, 4);
        assert_eq!(buf.cells(), before.cells());
    }

    #[test]
    fn test_box_with_background_fills() {
        let mut buf = CellBuffer::new(4, 4);
        NodeKind::Box(BoxProps::default().background(Rgba::BLUE)).paint(&mut buf, 1, 1, 2, 2);
        assert_eq!(buf.get_cell(1, 1).unwrap().bg, Rgba::BLUE);
        assert_eq!(buf.get_cell(2, 2).unwrap().bg, Rgba::BLUE);
        assert!(buf.get_cell(3, 3).unwrap().bg.is_transparent());
    }

    #[test]
    fn test_bordered_box() {
        let mut buf = CellBuffer::new(3, 3);
        let props = BoxProps::default().border(BorderStyle::Round, Some(Rgba::CYAN));
        NodeKind::Box(props).paint(&mut buf, 0, 0, 3, 3);
        assert_eq!(buf.row_text(0), "╭─╮");
        assert_eq!(buf.row_text(2), "╰─╯");
        assert_eq!(buf.get_cell(0, 0).unwrap().fg, Rgba::CYAN);
    }
}
