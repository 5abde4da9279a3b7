//! ANSI escape sequence generation.

pub mod output;
pub mod sequences;

pub use output::AnsiWriter;
pub use sequences::*;

use crate::color::Rgba;
use std::io::{self, Write};

/// Generate SGR (Select Graphic Rendition) sequence for a truecolor foreground.
#[must_use]
pub fn fg_color(color: Rgba) -> String {
    let mut buf = Vec::new();
    let _ = write_fg_color(&mut buf, color);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Generate SGR sequence for a truecolor background.
#[must_use]
pub fn bg_color(color: Rgba) -> String {
    let mut buf = Vec::new();
    let _ = write_bg_color(&mut buf, color);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write a u8 as decimal digits to a writer without formatting overhead.
#[inline]
fn write_u8_decimal(w: &mut impl Write, n: u8) -> io::Result<()> {
    if n >= 100 {
        w.write_all(&[b'0' + n / 100, b'0' + (n / 10) % 10, b'0' + n % 10])
    } else if n >= 10 {
        w.write_all(&[b'0' + n / 10, b'0' + n % 10])
    } else {
        w.write_all(&[b'0' + n])
    }
}

/// Write a u32 as decimal digits to a writer without formatting overhead.
///
/// Stack buffer is sized for max u32 digits (10) to avoid heap allocation.
#[inline]
fn write_u32_decimal(w: &mut impl Write, n: u32) -> io::Result<()> {
    if n < 10 {
        return w.write_all(&[b'0' + n as u8]);
    }
    if n < 100 {
        return w.write_all(&[b'0' + (n / 10) as u8, b'0' + (n % 10) as u8]);
    }

    let mut buf = [0u8; 10];
    let mut i = buf.len();
    let mut val = n;
    while val > 0 {
        i -= 1;
        buf[i] = b'0' + (val % 10) as u8;
        val /= 10;
    }
    w.write_all(&buf[i..])
}

fn write_rgb_params(w: &mut impl Write, color: Rgba) -> io::Result<()> {
    write_u8_decimal(w, color.r)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.g)?;
    w.write_all(b";")?;
    write_u8_decimal(w, color.b)?;
    w.write_all(b"m")
}

/// Write `ESC[38;2;r;g;bm`.
///
/// Uses direct byte writes to avoid `write!` formatting overhead on hot paths.
pub fn write_fg_color(w: &mut impl Write, color: Rgba) -> io::Result<()> {
    w.write_all(b"\x1b[38;2;")?;
    write_rgb_params(w, color)
}

/// Write `ESC[48;2;r;g;bm`.
pub fn write_bg_color(w: &mut impl Write, color: Rgba) -> io::Result<()> {
    w.write_all(b"\x1b[48;2;")?;
    write_rgb_params(w, color)
}

/// Write a background change, using the default-background code for
/// transparent colors.
pub fn write_bg_or_default(w: &mut impl Write, color: Rgba) -> io::Result<()> {
    if color.is_transparent() {
        w.write_all(sequences::color::BG_DEFAULT.as_bytes())
    } else {
        write_bg_color(w, color)
    }
}

/// Generate cursor position sequence from 0-based coordinates.
#[must_use]
pub fn cursor_position(row: u32, col: u32) -> String {
    let mut buf = Vec::new();
    let _ = write_cursor_position(&mut buf, row, col);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write `ESC[{row+1};{col+1}H` (terminal coordinates are 1-indexed).
pub fn write_cursor_position(w: &mut impl Write, row: u32, col: u32) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    write_u32_decimal(w, row.saturating_add(1))?;
    w.write_all(b";")?;
    write_u32_decimal(w, col.saturating_add(1))?;
    w.write_all(b"H")
}
