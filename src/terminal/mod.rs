//! Terminal session state: raw mode, alternate screen, mouse and cursor.

mod raw;
mod signals;

pub use raw::{RawModeGuard, enable_raw_mode, is_tty, terminal_size};
pub use signals::{ResizeWatch, poll_readable};

use crate::ansi::sequences;
use std::io::{self, Write};

/// Owns the output stream and remembers which terminal modes are active,
/// so every mode switch is written at most once and can be undone.
pub struct TerminalSession<W: Write> {
    writer: W,
    alt_screen: bool,
    mouse_enabled: bool,
    cursor_hidden: bool,
    raw_mode: Option<RawModeGuard>,
}

impl<W: Write> TerminalSession<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            alt_screen: false,
            mouse_enabled: false,
            cursor_hidden: false,
            raw_mode: None,
        }
    }

    #[must_use]
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode.is_some()
    }

    /// Put stdin into raw mode.
    pub fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.raw_mode.is_none() {
            self.raw_mode = Some(enable_raw_mode()?);
        }
        Ok(())
    }

    /// Restore stdin's line discipline.
    pub fn exit_raw_mode(&mut self) -> io::Result<()> {
        match self.raw_mode.take() {
            Some(guard) => guard.restore(),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_alt_screen(&self) -> bool {
        self.alt_screen
    }

    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        if !self.alt_screen {
            self.writer.write_all(sequences::ALT_SCREEN_ON.as_bytes())?;
            self.alt_screen = true;
        }
        Ok(())
    }

    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        if self.alt_screen {
            self.writer.write_all(sequences::ALT_SCREEN_OFF.as_bytes())?;
            self.alt_screen = false;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_mouse_enabled(&self) -> bool {
        self.mouse_enabled
    }

    /// Enable button and drag reporting in SGR encoding.
    pub fn enable_mouse(&mut self) -> io::Result<()> {
        if !self.mouse_enabled {
            self.writer.write_all(sequences::MOUSE_ON.as_bytes())?;
            self.mouse_enabled = true;
        }
        Ok(())
    }

    pub fn disable_mouse(&mut self) -> io::Result<()> {
        if self.mouse_enabled {
            self.writer.write_all(sequences::MOUSE_OFF.as_bytes())?;
            self.mouse_enabled = false;
        }
        Ok(())
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_HIDE.as_bytes())?;
            self.cursor_hidden = true;
        }
        Ok(())
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        if self.cursor_hidden {
            self.writer.write_all(sequences::CURSOR_SHOW.as_bytes())?;
            self.cursor_hidden = false;
        }
        Ok(())
    }

    /// Emit a full SGR reset.
    pub fn reset_style(&mut self) -> io::Result<()> {
        self.writer.write_all(sequences::RESET.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Give back the output stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
