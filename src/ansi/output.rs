//! Buffered ANSI output writer with state tracking.

use crate::ansi::{self, sequences};
use crate::cell::Cell;
use crate::color::Rgba;
use std::io::{self, Write};

/// Buffered writer that tracks the last emitted SGR state so each changed
/// cell only pays for the codes that differ from what the terminal already
/// has active.
///
/// The tracked state is the *emitted* state, not the previous frame's cell,
/// so cells must be written in a fixed scan order for it to stay valid.
pub struct AnsiWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,

    // Last emitted state for delta encoding
    last_fg: Option<Rgba>,
    last_bg: Option<Rgba>,
    last_bold: bool,

    cells_written: usize,
}

impl<W: Write> AnsiWriter<W> {
    /// Create a new ANSI writer wrapping the given output.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(8192),
            last_fg: None,
            last_bg: None,
            last_bold: false,
            cells_written: 0,
        }
    }

    /// Forget the emitted state, as after a terminal reset.
    pub fn reset_state(&mut self) {
        self.last_fg = None;
        self.last_bg = None;
        self.last_bold = false;
    }

    /// Write a raw string to the buffer.
    pub fn write_str(&mut self, s: &str) {
        self.buffer.extend_from_slice(s.as_bytes());
    }

    /// Move the cursor to a 0-based cell position.
    pub fn move_cursor(&mut self, row: u32, col: u32) {
        let _ = ansi::write_cursor_position(&mut self.buffer, row, col);
    }

    /// Set foreground color if different from the last emitted one.
    pub fn set_fg(&mut self, color: Rgba) {
        if self.last_fg != Some(color) {
            let _ = ansi::write_fg_color(&mut self.buffer, color);
            self.last_fg = Some(color);
        }
    }

    /// Set background color if different from the last emitted one.
    pub fn set_bg(&mut self, color: Rgba) {
        if self.last_bg != Some(color) {
            let _ = ansi::write_bg_or_default(&mut self.buffer, color);
            self.last_bg = Some(color);
        }
    }

    /// Switch bold on or off.
    ///
    /// There is no "bold off" code in the emitted token set, so turning bold
    /// off is a full reset followed by re-emitting the active colors.
    pub fn set_bold(&mut self, bold: bool) {
        if self.last_bold == bold {
            return;
        }
        self.last_bold = bold;

        if bold {
            self.write_str(sequences::BOLD);
            return;
        }

        self.write_str(sequences::RESET);
        if let Some(fg) = self.last_fg {
            let _ = ansi::write_fg_color(&mut self.buffer, fg);
        }
        if let Some(bg) = self.last_bg.filter(|bg| !bg.is_transparent()) {
            let _ = ansi::write_bg_color(&mut self.buffer, bg);
        }
    }

    /// Emit one changed cell: position, style prologue, glyph.
    pub fn write_cell(&mut self, x: u32, y: u32, cell: &Cell) {
        self.move_cursor(y, x);
        self.set_fg(cell.fg);
        self.set_bg(cell.bg);
        self.set_bold(cell.is_bold());
        if cell.is_italic() {
            self.write_str(sequences::ITALIC);
        }
        if cell.is_underline() {
            self.write_str(sequences::UNDERLINE);
        }
        let _ = cell.write_content(&mut self.buffer);
        self.cells_written += 1;
    }

    /// Append the trailing reset that closes a frame.
    pub fn finish(&mut self) {
        self.write_str(sequences::RESET);
        self.reset_state();
    }

    /// Number of cells emitted since creation.
    #[must_use]
    pub fn cells_written(&self) -> usize {
        self.cells_written
    }

    /// Bytes buffered but not yet flushed.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Flush buffered output to the underlying writer.
    ///
    /// Returns the number of bytes written.
    pub fn flush(&mut self) -> io::Result<usize> {
        let len = self.buffer.len();
        if len > 0 {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        self.writer.flush()?;
        Ok(len)
    }
}
