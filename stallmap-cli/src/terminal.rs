//! Terminal mode snapshot.
//!
//! The password prompt switches echo off on the controlling terminal and
//! turns it back on when the read finishes. Ctrl-C ends the process in the
//! middle of that read, so `main` captures the mode up front and puts it
//! back before exiting.

use std::io;

#[cfg(unix)]
use std::fs::File;
#[cfg(unix)]
use std::os::fd::AsRawFd;

/// Controlling terminal device.
#[cfg(unix)]
const TTY_PATH: &str = "/dev/tty";

/// Saved attributes of a terminal.
pub struct TerminalMode {
    #[cfg(unix)]
    tty: File,
    #[cfg(unix)]
    attrs: libc::termios,
}

impl TerminalMode {
    /// Captures the controlling terminal's mode. `None` without a terminal.
    pub fn capture_tty() -> Option<Self> {
        #[cfg(unix)]
        {
            let tty = std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .open(TTY_PATH)
                .ok()?;
            Self::capture(tty)
        }
        #[cfg(not(unix))]
        {
            None
        }
    }

    /// Captures the mode of `tty`. `None` if it is not a terminal.
    #[cfg(unix)]
    pub fn capture(tty: File) -> Option<Self> {
        use std::mem::MaybeUninit;

        let mut attrs: MaybeUninit<libc::termios> = MaybeUninit::uninit();
        let result = unsafe { libc::tcgetattr(tty.as_raw_fd(), attrs.as_mut_ptr()) };
        if result != 0 {
            return None;
        }

        let attrs = unsafe { attrs.assume_init() };
        Some(Self { tty, attrs })
    }

    /// Writes the captured mode back.
    pub fn restore(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            let result =
                unsafe { libc::tcsetattr(self.tty.as_raw_fd(), libc::TCSANOW, &self.attrs) };
            if result != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
