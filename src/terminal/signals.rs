//! Window-size change notification and stdin readiness.

#![allow(unsafe_code)]

use std::io;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Set by the SIGWINCH handler, consumed by [`ResizeWatch::take_resized`].
static RESIZED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

/// Installed SIGWINCH handler. Dropping it restores the default disposition.
#[derive(Debug)]
pub struct ResizeWatch {
    _private: (),
}

impl ResizeWatch {
    pub fn install() -> io::Result<Self> {
        RESIZED.store(false, Ordering::Relaxed);
        // SAFETY: the handler only stores to an atomic
        let rc = unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = on_sigwinch as *const () as usize;
            sa.sa_flags = libc::SA_RESTART;
            libc::sigemptyset(&raw mut sa.sa_mask);
            libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut())
        };
        if rc == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { _private: () })
    }

    /// Whether a resize arrived since the last call.
    #[must_use]
    pub fn take_resized(&self) -> bool {
        RESIZED.swap(false, Ordering::Relaxed)
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        // SAFETY: restoring SIG_DFL is always valid
        unsafe {
            libc::signal(libc::SIGWINCH, libc::SIG_DFL);
        }
    }
}

/// Wait up to `timeout` for `fd` to become readable.
///
/// An interrupted wait (for example by SIGWINCH) reports not-ready.
pub fn poll_readable(fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    // SAFETY: one valid pollfd
    let rc = unsafe { libc::poll(&raw mut pfd, 1, millis) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(rc > 0 && pfd.revents & libc::POLLIN != 0)
}
