//! Constant ANSI escape sequences.

/// Reset all attributes to default.
pub const RESET: &str = "\x1b[0m";

/// Bold/increased intensity.
pub const BOLD: &str = "\x1b[1m";

/// Dim/decreased intensity.
pub const DIM: &str = "\x1b[2m";

/// Italic.
pub const ITALIC: &str = "\x1b[3m";

/// Underline.
pub const UNDERLINE: &str = "\x1b[4m";

/// Swapped foreground/background.
pub const INVERSE: &str = "\x1b[7m";

/// Strikethrough.
pub const STRIKETHROUGH: &str = "\x1b[9m";

/// Clear entire screen.
pub const CLEAR_SCREEN: &str = "\x1b[2J";

/// Clear from cursor to end of screen.
pub const CLEAR_SCREEN_BELOW: &str = "\x1b[J";

/// Clear entire line.
pub const CLEAR_LINE: &str = "\x1b[2K";

/// Clear from cursor to end of line.
pub const CLEAR_LINE_RIGHT: &str = "\x1b[K";

/// Hide cursor.
pub const CURSOR_HIDE: &str = "\x1b[?25l";

/// Show cursor.
pub const CURSOR_SHOW: &str = "\x1b[?25h";

/// Save cursor position (SCO).
pub const CURSOR_SAVE: &str = "\x1b[s";

/// Restore cursor position (SCO).
pub const CURSOR_RESTORE: &str = "\x1b[u";

/// Enable alternative screen buffer.
pub const ALT_SCREEN_ON: &str = "\x1b[?1049h";

/// Disable alternative screen buffer.
pub const ALT_SCREEN_OFF: &str = "\x1b[?1049l";

/// Enable mouse reporting: button presses, drags, SGR extended coordinates.
pub const MOUSE_ON: &str = "\x1b[?1000h\x1b[?1002h\x1b[?1006h";

/// Disable mouse reporting.
pub const MOUSE_OFF: &str = "\x1b[?1000l\x1b[?1002l\x1b[?1006l";

/// Enable any-motion mouse reporting.
pub const MOUSE_MOTION_ON: &str = "\x1b[?1003h";

/// Disable any-motion mouse reporting.
pub const MOUSE_MOTION_OFF: &str = "\x1b[?1003l";

/// Color reset sequences.
pub mod color {
    /// Reset foreground to default.
    pub const FG_DEFAULT: &str = "\x1b[39m";
    /// Reset background to default.
    pub const BG_DEFAULT: &str = "\x1b[49m";
}
