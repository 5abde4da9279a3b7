//! Raw input mode and window size queries over termios.
//!
//! # Safety
//! Everything here is thin FFI over libc termios and ioctl calls.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Restores the saved termios settings of a descriptor when dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    saved: libc::termios,
}

impl RawModeGuard {
    /// Switch `fd` to raw input: no echo, no line editing, no signal keys.
    ///
    /// Ctrl+C therefore arrives as the byte `0x03` instead of raising SIGINT.
    pub fn enable<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let saved = read_termios(fd)?;
        let mut raw = saved;
        make_raw(&mut raw);
        write_termios(fd, &raw)?;
        Ok(Self { fd, saved })
    }

    /// Put the saved settings back now rather than on drop.
    pub fn restore(&self) -> io::Result<()> {
        write_termios(self.fd, &self.saved)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Raw mode on standard input.
pub fn enable_raw_mode() -> io::Result<RawModeGuard> {
    RawModeGuard::enable(&io::stdin())
}

/// Clear the line-discipline flags that stand between keys and the reader.
fn make_raw(t: &mut libc::termios) {
    t.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    t.c_oflag &= !libc::OPOST;
    t.c_cflag |= libc::CS8;
    t.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    // Reads return whatever is available, waiting at most 100ms.
    t.c_cc[libc::VMIN] = 0;
    t.c_cc[libc::VTIME] = 1;
}

#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty accepts any descriptor value
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Columns and rows of the terminal attached to stdout.
///
/// A terminal reporting zero in either dimension is treated as an error.
pub fn terminal_size() -> io::Result<(u32, u32)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    // SAFETY: TIOCGWINSZ fills the winsize struct we pass
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }
    if ws.ws_col == 0 || ws.ws_row == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal reported zero dimensions",
        ));
    }
    Ok((u32::from(ws.ws_col), u32::from(ws.ws_row)))
}

fn read_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut t: libc::termios = unsafe { std::mem::zeroed() };
    // SAFETY: tcgetattr writes into the struct we own
    if unsafe { libc::tcgetattr(fd, &mut t) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(t)
}

fn write_termios(fd: RawFd, t: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr only reads the struct
    if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, t) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_raw_clears_line_discipline() {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        t.c_lflag = libc::ECHO | libc::ICANON | libc::ISIG;
        t.c_iflag = libc::ICRNL | libc::IXON;
        make_raw(&mut t);
        assert_eq!(t.c_lflag & (libc::ECHO | libc::ICANON | libc::ISIG), 0);
        assert_eq!(t.c_iflag & (libc::ICRNL | libc::IXON), 0);
        assert_ne!(t.c_cflag & libc::CS8, 0);
        assert_eq!(t.c_cc[libc::VMIN], 0);
        assert_eq!(t.c_cc[libc::VTIME], 1);
    }

    #[test]
    fn test_regular_file_is_not_tty() {
        let file = tempfile::tempfile().unwrap();
        assert!(!is_tty(&file));
    }

    #[test]
    fn test_raw_mode_on_file_fails() {
        let file = tempfile::tempfile().unwrap();
        assert!(RawModeGuard::enable(&file).is_err());
    }

    #[test]
    fn test_terminal_size_reasonable_when_available() {
        if let Ok((cols, rows)) = terminal_size() {
            assert!(cols > 0 && rows > 0);
        }
    }
}
