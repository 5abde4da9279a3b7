//! Cell-based frame buffer with scissoring and differential ANSI output.
//!
//! [`CellBuffer`] is the drawing surface every scene node paints into. Two of
//! them form the renderer's double buffer: the frame being painted and the
//! last committed frame, which [`CellBuffer::to_ansi`] diffs against.
//!
//! # Examples
//!
//! ```
//! use termscene::buffer::{BorderStyle, CellBuffer, ClipRect};
//! use termscene::Rgba;
//!
//! let mut buf = CellBuffer::new(20, 5);
//! buf.clear(Some(Rgba::BLACK));
//! buf.draw_box(0, 0, 20, 5, BorderStyle::Round, Some(Rgba::CYAN), None);
//! buf.draw_text(2, 2, "hello", Some(Rgba::GREEN), None);
//!
//! // Writes outside the active scissor are dropped.
//! buf.push_scissor(ClipRect::new(0, 0, 4, 5));
//! buf.draw_text(2, 3, "clipped", None, None);
//! buf.pop_scissor();
//!
//! let first = buf.to_ansi(None);
//! assert!(first.ends_with("\x1b[0m"));
//! assert_eq!(buf.to_ansi(Some(&buf.clone())), "\x1b[0m");
//! ```

// Drawing calls mirror the terminal's (x, y, w, h, style...) shape
#![allow(clippy::too_many_arguments)]

mod drawing;
mod opacity;
mod scissor;

pub use drawing::{BorderGlyphs, BorderStyle};
pub use opacity::OpacityStack;
pub use scissor::{ClipRect, ScissorStack};

use crate::ansi::AnsiWriter;
use crate::cell::{Cell, CellContent};
use crate::color::Rgba;
use crate::style::CellStyle;
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;

/// A width×height grid of [`Cell`]s plus scissor and opacity stacks.
///
/// Coordinates are signed so that partially off-screen content can be drawn
/// without clipping at the call site: every mutator accepts any `(x, y)` and
/// silently ignores positions outside the grid.
#[derive(Clone, Debug)]
pub struct CellBuffer {
    width: u32,
    height: u32,
    cells: Vec<Cell>,

    scissor_stack: ScissorStack,
    opacity_stack: OpacityStack,
}

impl CellBuffer {
    /// Create a buffer filled with default cells.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
            scissor_stack: ScissorStack::new(),
            opacity_stack: OpacityStack::new(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn cell_index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        (idx < self.cells.len()).then_some(idx)
    }

    /// Reallocate the grid, discarding contents and both stacks.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Reset every cell to the default glyph and style over `bg`
    /// (transparent when `None`).
    pub fn clear(&mut self, bg: Option<Rgba>) {
        let blank = Cell::blank(bg.unwrap_or(Rgba::TRANSPARENT));
        self.cells.fill(blank);
    }

    /// Drop the cell storage. The buffer keeps its stated size but every
    /// access behaves as out of bounds until the next [`resize`](Self::resize).
    pub fn release(&mut self) {
        self.cells = Vec::new();
        self.scissor_stack.clear();
        self.opacity_stack.clear();
    }

    /// Whether the cell storage has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.cells.is_empty() && self.width > 0 && self.height > 0
    }

    // ------------------------------------------------------------------
    // Cell access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get_cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.cell_index(x, y).map(|idx| &self.cells[idx])
    }

    /// Write one grapheme at `(x, y)`.
    ///
    /// Colors left as `None` keep the cell's current value. Style flags are
    /// untouched. Dropped when out of bounds or outside the active scissor.
    pub fn set_cell(&mut self, x: i32, y: i32, grapheme: &str, fg: Option<Rgba>, bg: Option<Rgba>) {
        self.write_cell(x, y, CellContent::from_grapheme(grapheme), fg, bg);
    }

    /// [`set_cell`](Self::set_cell) for a single `char`.
    pub fn set_char(&mut self, x: i32, y: i32, ch: char, fg: Option<Rgba>, bg: Option<Rgba>) {
        self.write_cell(x, y, CellContent::Char(ch), fg, bg);
    }

    fn write_cell(
        &mut self,
        x: i32,
        y: i32,
        content: CellContent,
        fg: Option<Rgba>,
        bg: Option<Rgba>,
    ) -> bool {
        let Some(idx) = self.cell_index(x, y) else {
            return false;
        };
        if !self.scissor_stack.contains(x, y) {
            return false;
        }
        let cell = &mut self.cells[idx];
        cell.content = content;
        if let Some(fg) = fg {
            cell.fg = fg;
        }
        if let Some(bg) = bg {
            cell.bg = bg;
        }
        true
    }

    /// Update style flags at `(x, y)`. Only the bounds are checked; the
    /// scissor does not apply to style updates.
    pub fn set_cell_style(&mut self, x: i32, y: i32, style: CellStyle) {
        if let Some(idx) = self.cell_index(x, y) {
            let cell = &mut self.cells[idx];
            cell.attributes = style.apply(cell.attributes);
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draw a single line of text, one grapheme cluster per cell.
    ///
    /// Newlines are skipped without advancing; callers split multi-line
    /// content themselves.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Option<Rgba>, bg: Option<Rgba>) {
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if grapheme == "\n" || grapheme == "\r\n" {
                continue;
            }
            self.set_cell(col, y, grapheme, fg, bg);
            col = col.saturating_add(1);
        }
    }

    /// Fill a rectangle with spaces over `bg`. Foreground colors and style
    /// flags already in the cells are kept.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, bg: Option<Rgba>) {
        // Clamp to the grid so huge rectangles don't spin on dropped writes
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        for row in y0..y1 {
            for col in x0..x1 {
                self.write_cell(col, row, CellContent::Char(' '), None, bg);
            }
        }
    }

    /// Draw a bordered box.
    ///
    /// With [`BorderStyle::None`] the whole rectangle is filled with `bg`.
    /// Otherwise the six border glyphs are drawn in `border_color` and, if a
    /// background is given, the interior is filled with it.
    pub fn draw_box(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        style: BorderStyle,
        border_color: Option<Rgba>,
        bg: Option<Rgba>,
    ) {
        let Some(glyphs) = style.glyphs() else {
            self.fill_rect(x, y, w, h, bg);
            return;
        };

        let right = x.saturating_add(w).saturating_sub(1);
        let bottom = y.saturating_add(h).saturating_sub(1);

        self.set_char(x, y, glyphs.top_left, border_color, None);
        self.set_char(right, y, glyphs.top_right, border_color, None);
        self.set_char(x, bottom, glyphs.bottom_left, border_color, None);
        self.set_char(right, bottom, glyphs.bottom_right, border_color, None);

        for i in 1..w.saturating_sub(1) {
            self.set_char(x + i, y, glyphs.horizontal, border_color, None);
            self.set_char(x + i, bottom, glyphs.horizontal, border_color, None);
        }
        for i in 1..h.saturating_sub(1) {
            self.set_char(x, y + i, glyphs.vertical, border_color, None);
            self.set_char(right, y + i, glyphs.vertical, border_color, None);
        }

        if bg.is_some() {
            self.fill_rect(x + 1, y + 1, w - 2, h - 2, bg);
        }
    }

    /// Blit `source` with its top-left corner at `(x, y)`.
    ///
    /// Cells that are a space over a transparent background are skipped, so
    /// a sparsely drawn source composes over what is already here.
    pub fn draw_frame_buffer(&mut self, x: i32, y: i32, source: &CellBuffer) {
        for (sx, sy, cell) in source.iter_cells() {
            if cell.is_see_through() {
                continue;
            }
            let dx = x.saturating_add(sx as i32);
            let dy = y.saturating_add(sy as i32);
            let written = self.write_cell(dx, dy, cell.content.clone(), Some(cell.fg), Some(cell.bg));
            if written {
                self.set_cell_style(dx, dy, CellStyle::from_attributes(cell.attributes));
            }
        }
    }

    // ------------------------------------------------------------------
    // Scissor / opacity
    // ------------------------------------------------------------------

    pub fn push_scissor(&mut self, rect: ClipRect) {
        self.scissor_stack.push(rect);
    }

    pub fn pop_scissor(&mut self) {
        self.scissor_stack.pop();
    }

    /// Push an opacity multiplier. Tracked only; drawing does not blend.
    pub fn push_opacity(&mut self, opacity: f32) {
        self.opacity_stack.push(opacity);
    }

    pub fn pop_opacity(&mut self) {
        self.opacity_stack.pop();
    }

    #[must_use]
    pub fn current_opacity(&self) -> f32 {
        self.opacity_stack.current()
    }

    // ------------------------------------------------------------------
    // Differential output
    // ------------------------------------------------------------------

    /// Encode this frame as ANSI, emitting only cells that differ from
    /// `previous`.
    ///
    /// With no previous frame (or a cell that falls outside it) every cell
    /// counts as changed. The output always ends with a full reset.
    #[must_use]
    pub fn to_ansi(&self, previous: Option<&CellBuffer>) -> String {
        let mut writer = AnsiWriter::new(Vec::new());
        self.encode_diff(&mut writer, previous);
        String::from_utf8_lossy(writer.pending()).into_owned()
    }

    /// Stream the diff against `previous` into `out`.
    ///
    /// Returns the number of bytes written.
    pub fn write_ansi<W: Write>(&self, out: W, previous: Option<&CellBuffer>) -> io::Result<usize> {
        let mut writer = AnsiWriter::new(out);
        self.encode_diff(&mut writer, previous);
        writer.flush()
    }

    /// Number of cells the diff against `previous` would emit.
    #[must_use]
    pub fn count_changed(&self, previous: Option<&CellBuffer>) -> usize {
        self.iter_cells()
            .filter(|(x, y, cell)| !Self::unchanged(cell, previous, *x, *y))
            .count()
    }

    fn unchanged(cell: &Cell, previous: Option<&CellBuffer>, x: u32, y: u32) -> bool {
        previous
            .and_then(|prev| prev.get_cell(x as i32, y as i32))
            .is_some_and(|prev| cell.diff_eq(prev))
    }

    // Row-major order is load-bearing: the writer's SGR state tracking
    // assumes cells arrive in scan order.
    fn encode_diff<W: Write>(&self, writer: &mut AnsiWriter<W>, previous: Option<&CellBuffer>) {
        for (x, y, cell) in self.iter_cells() {
            if Self::unchanged(cell, previous, x, y) {
                continue;
            }
            writer.write_cell(x, y, cell);
        }
        writer.finish();
    }

    // ------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over cells with their `(x, y)` positions in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        let width = self.width.max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u32;
            (i % width, i / width, cell)
        })
    }

    /// The glyphs of row `y` concatenated, for tests and debugging.
    #[must_use]
    pub fn row_text(&self, y: u32) -> String {
        self.iter_cells()
            .filter(|(_, row, _)| *row == y)
            .map(|(_, _, cell)| cell.content.to_string())
            .collect()
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)] // Exact float comparison is intentional in tests
    use super::*;
    use crate::style::TextAttributes;

    fn glyph(buf: &CellBuffer, x: i32, y: i32) -> String {
        buf.get_cell(x, y).unwrap().content.to_string()
    }

    // =========================================================================
    // Creation & sizing
    // =========================================================================

    #[test]
    fn test_new_buffer_has_default_cells() {
        let buf = CellBuffer::new(4, 3);
        assert_eq!(buf.size(), (4, 3));
        assert_eq!(buf.cells().len(), 12);
        assert!(buf.cells().iter().all(|c| *c == Cell::default()));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut buf = CellBuffer::new(5, 5);
        buf.set_cell(4, 4, "x", None, None);
        buf.push_scissor(ClipRect::new(0, 0, 1, 1));
        buf.resize(8, 2);
        assert_eq!(buf.size(), (8, 2));
        assert!(buf.get_cell(4, 4).is_none());
        assert_eq!(glyph(&buf, 7, 1), " ");
        // Scissor was dropped with the old grid
        buf.set_cell(7, 1, "y", None, None);
        assert_eq!(glyph(&buf, 7, 1), "y");
    }

    #[test]
    fn test_clear_resets_glyph_and_style() {
        let mut buf = CellBuffer::new(3, 1);
        buf.set_cell(1, 0, "q", Some(Rgba::RED), Some(Rgba::BLUE));
        buf.set_cell_style(1, 0, CellStyle::NONE.bold(true));

        buf.clear(Some(Rgba::GREEN));
        let cell = buf.get_cell(1, 0).unwrap();
        assert_eq!(*cell, Cell::blank(Rgba::GREEN));

        buf.clear(None);
        assert!(buf.get_cell(1, 0).unwrap().bg.is_transparent());
    }

    #[test]
    fn test_release() {
        let mut buf = CellBuffer::new(3, 3);
        buf.release();
        assert!(buf.is_released());
        assert!(buf.get_cell(0, 0).is_none());
        buf.set_cell(0, 0, "x", None, None);
        buf.resize(3, 3);
        assert!(!buf.is_released());
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    #[test]
    fn test_set_get_cell() {
        let mut buf = CellBuffer::new(10, 10);
        buf.set_cell(3, 4, "Z", Some(Rgba::RED), Some(Rgba::BLUE));
        let cell = buf.get_cell(3, 4).unwrap();
        assert_eq!(cell.content, CellContent::Char('Z'));
        assert_eq!(cell.fg, Rgba::RED);
        assert_eq!(cell.bg, Rgba::BLUE);
    }

    #[test]
    fn test_set_cell_keeps_unspecified_colors() {
        let mut buf = CellBuffer::new(2, 1);
        buf.set_cell(0, 0, "a", Some(Rgba::RED), Some(Rgba::BLUE));
        buf.set_cell(0, 0, "b", None, None);
        let cell = buf.get_cell(0, 0).unwrap();
        assert_eq!(cell.content, CellContent::Char('b'));
        assert_eq!(cell.fg, Rgba::RED);
        assert_eq!(cell.bg, Rgba::BLUE);
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut buf = CellBuffer::new(4, 4);
        let before = buf.clone();
        buf.set_cell(-1, 0, "x", None, None);
        buf.set_cell(0, -1, "x", None, None);
        buf.set_cell(4, 0, "x", None, None);
        buf.set_cell(i32::MAX, i32::MAX, "x", None, None);
        buf.set_cell_style(9, 9, CellStyle::NONE.bold(true));
        assert_eq!(buf.cells(), before.cells());
        assert!(buf.get_cell(-1, -1).is_none());
    }

    #[test]
    fn test_set_cell_style_partial() {
        let mut buf = CellBuffer::new(2, 1);
        buf.set_cell_style(0, 0, CellStyle::NONE.bold(true).underline(true));
        buf.set_cell_style(0, 0, CellStyle::NONE.underline(false).strikethrough(true));
        let cell = buf.get_cell(0, 0).unwrap();
        assert_eq!(
            cell.attributes,
            TextAttributes::BOLD | TextAttributes::STRIKETHROUGH
        );
    }

    // =========================================================================
    // Scissor & opacity
    // =========================================================================

    #[test]
    fn test_scissor_drops_outside_writes() {
        let mut buf = CellBuffer::new(10, 1);
        buf.push_scissor(ClipRect::new(2, 0, 3, 1));
        buf.draw_text(0, 0, "abcdefgh", None, None);
        buf.pop_scissor();
        assert_eq!(buf.row_text(0), "  cde     ");
    }

    #[test]
    fn test_scissor_does_not_apply_to_style() {
        let mut buf = CellBuffer::new(3, 1);
        buf.push_scissor(ClipRect::new(0, 0, 1, 1));
        buf.set_cell_style(2, 0, CellStyle::NONE.italic(true));
        assert!(buf.get_cell(2, 0).unwrap().is_italic());
    }

    #[test]
    fn test_opacity_is_tracked_not_blended() {
        let mut buf = CellBuffer::new(1, 1);
        buf.push_opacity(0.5);
        buf.set_cell(0, 0, "x", Some(Rgba::RED), Some(Rgba::BLUE));
        assert_eq!(buf.current_opacity(), 0.5);
        assert_eq!(buf.get_cell(0, 0).unwrap().fg, Rgba::RED);
        buf.pop_opacity();
        assert_eq!(buf.current_opacity(), 1.0);
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    #[test]
    fn test_draw_text_skips_newlines_without_advancing() {
        let mut buf = CellBuffer::new(6, 2);
        buf.draw_text(0, 0, "ab\ncd", None, None);
        assert_eq!(buf.row_text(0), "abcd  ");
        assert_eq!(buf.row_text(1), "      ");
    }

    #[test]
    fn test_draw_text_graphemes_take_one_cell() {
        let mut buf = CellBuffer::new(4, 1);
        buf.draw_text(0, 0, "e\u{301}x", None, None);
        assert_eq!(glyph(&buf, 0, 0), "e\u{301}");
        assert_eq!(glyph(&buf, 1, 0), "x");
    }

    #[test]
    fn test_draw_text_partially_offscreen() {
        let mut buf = CellBuffer::new(3, 1);
        buf.draw_text(-2, 0, "hello", None, None);
        assert_eq!(buf.row_text(0), "llo");
    }

    #[test]
    fn test_fill_rect_keeps_foreground() {
        let mut buf = CellBuffer::new(4, 4);
        buf.set_cell(1, 1, "x", Some(Rgba::RED), None);
        buf.fill_rect(0, 0, 2, 2, Some(Rgba::BLUE));
        let cell = buf.get_cell(1, 1).unwrap();
        assert!(cell.content.is_space());
        assert_eq!(cell.fg, Rgba::RED);
        assert_eq!(cell.bg, Rgba::BLUE);
        assert!(buf.get_cell(2, 2).unwrap().bg.is_transparent());
    }

    #[test]
    fn test_draw_box_single() {
        let mut buf = CellBuffer::new(4, 3);
        buf.draw_box(0, 0, 4, 3, BorderStyle::Single, Some(Rgba::RED), None);
        assert_eq!(buf.row_text(0), "┌──┐");
        assert_eq!(buf.row_text(1), "│  │");
        assert_eq!(buf.row_text(2), "└──┘");
        assert_eq!(buf.get_cell(0, 0).unwrap().fg, Rgba::RED);
        // No bg given: interior untouched
        assert!(buf.get_cell(1, 1).unwrap().bg.is_transparent());
    }

    #[test]
    fn test_draw_box_fills_interior() {
        let mut buf = CellBuffer::new(5, 4);
        buf.draw_box(0, 0, 5, 4, BorderStyle::Double, None, Some(Rgba::BLUE));
        assert_eq!(buf.row_text(0), "╔═══╗");
        assert_eq!(buf.get_cell(2, 2).unwrap().bg, Rgba::BLUE);
        // Border cells keep their background
        assert!(buf.get_cell(0, 0).unwrap().bg.is_transparent());
    }

    #[test]
    fn test_draw_box_none_writes_no_glyphs() {
        let mut buf = CellBuffer::new(4, 3);
        buf.draw_box(0, 0, 4, 3, BorderStyle::None, Some(Rgba::RED), Some(Rgba::BLUE));
        for (_, _, cell) in buf.iter_cells() {
            assert!(cell.content.is_space());
            assert_eq!(cell.bg, Rgba::BLUE);
            assert_eq!(cell.fg, Rgba::WHITE);
        }
    }

    #[test]
    fn test_draw_box_degenerate_sizes() {
        let mut buf = CellBuffer::new(3, 3);
        buf.draw_box(1, 1, 1, 1, BorderStyle::Round, None, None);
        // Corners collapse onto one cell; the last write wins
        assert_eq!(glyph(&buf, 1, 1), "╯");
        buf.draw_box(0, 0, 0, 0, BorderStyle::Single, None, Some(Rgba::RED));
    }

    #[test]
    fn test_draw_frame_buffer_skips_see_through_cells() {
        let mut dst = CellBuffer::new(4, 1);
        dst.draw_text(0, 0, "abcd", None, None);

        let mut src = CellBuffer::new(3, 1);
        src.set_cell(0, 0, "X", Some(Rgba::RED), None);
        src.set_cell(2, 0, " ", None, Some(Rgba::BLUE));
        src.set_cell_style(0, 0, CellStyle::NONE.bold(true));

        dst.draw_frame_buffer(1, 0, &src);
        assert_eq!(dst.row_text(0), "aXc ");
        assert!(dst.get_cell(1, 0).unwrap().is_bold());
        assert_eq!(dst.get_cell(3, 0).unwrap().bg, Rgba::BLUE);
    }

    // =========================================================================
    // Differential output
    // =========================================================================

    #[test]
    fn test_to_ansi_identical_frames_emit_only_reset() {
        let mut buf = CellBuffer::new(5, 2);
        buf.draw_text(0, 0, "hello", Some(Rgba::RED), Some(Rgba::BLACK));
        assert_eq!(buf.to_ansi(Some(&buf.clone())), "\x1b[0m");
        assert_eq!(buf.count_changed(Some(&buf.clone())), 0);
    }

    #[test]
    fn test_to_ansi_without_previous_emits_every_cell() {
        let buf = CellBuffer::new(3, 2);
        assert_eq!(buf.count_changed(None), 6);
        let out = buf.to_ansi(None);
        assert!(out.starts_with("\x1b[1;1H"));
        assert!(out.contains("\x1b[2;3H"));
    }

    #[test]
    fn test_to_ansi_single_change() {
        let prev = CellBuffer::new(3, 3);
        let mut cur = prev.clone();
        cur.set_cell(1, 2, "x", Some(Rgba::RED), Some(Rgba::BLUE));
        assert_eq!(
            cur.to_ansi(Some(&prev)),
            "\x1b[3;2H\x1b[38;2;255;0;0m\x1b[48;2;0;0;255mx\x1b[0m"
        );
    }

    #[test]
    fn test_strikethrough_is_not_diffed() {
        let prev = CellBuffer::new(2, 1);
        let mut cur = prev.clone();
        cur.set_cell_style(0, 0, CellStyle::NONE.strikethrough(true));
        assert_eq!(cur.to_ansi(Some(&prev)), "\x1b[0m");

        cur.set_cell_style(0, 0, CellStyle::NONE.underline(true));
        assert_eq!(cur.count_changed(Some(&prev)), 1);
    }

    #[test]
    fn test_size_mismatch_counts_as_changed() {
        let prev = CellBuffer::new(2, 2);
        let cur = CellBuffer::new(3, 2);
        assert_eq!(cur.count_changed(Some(&prev)), 2);
    }

    #[test]
    fn test_write_ansi_matches_to_ansi() {
        let mut buf = CellBuffer::new(4, 1);
        buf.draw_text(0, 0, "ab", Some(Rgba::GREEN), None);
        let mut out = Vec::new();
        let n = buf.write_ansi(&mut out, None).unwrap();
        assert_eq!(n, out.len());
        assert_eq!(String::from_utf8(out).unwrap(), buf.to_ansi(None));
    }
}
