// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode and window size, with guaranteed restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, atexit, and raw fd writes. These
// are the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `RawMode` captures the
// original termios, switches the TTY to byte-at-a-time input with a 100 ms
// read timeout, and puts the original back when it is dropped.
//
// Drop alone is not enough: `process::exit` skips destructors, and a panic
// while the stdout lock is held must not deadlock the cleanup. So the
// original termios also lives in a global backup that two more hooks
// restore from:
//
//   - an `atexit` handler, covering every path through `exit()`;
//   - a panic hook, which writes a short reset sequence straight to fd 1
//     (bypassing Rust's stdout lock) and restores termios before the
//     default handler prints the message.
//
// All three paths take the backup out of the mutex, so whichever runs first
// restores and the others do nothing.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::reader::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero columns.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Longest cursor position report we are willing to read.
const REPORT_MAX: usize = 31;

/// Determine the size by parking the cursor in the far corner and asking
/// where it ended up.
///
/// Must run in raw mode: the reply arrives on stdin as `ESC [ r ; c R` and
/// would otherwise be echoed and line-buffered.
///
/// # Errors
///
/// Returns an error if writing the probe fails, reading the reply fails, or
/// the reply is not a cursor position report.
pub fn probe_size(out: &mut impl Write, input: &mut impl ByteSource) -> io::Result<Size> {
    ansi::cursor_to_far_corner(out)?;
    ansi::request_cursor_position(out)?;
    out.flush()?;

    let mut reply = Vec::with_capacity(REPORT_MAX);
    while reply.len() < REPORT_MAX {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }

    parse_cursor_report(&reply).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal did not report its cursor position",
        )
    })
}

/// Parse a cursor position report body, `ESC [ rows ; cols` (the final `R`
/// already stripped).
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let sep = body.iter().position(|&b| b == b';')?;
    let rows = parse_u16(&body[..sep])?;
    let cols = parse_u16(&body[sep + 1..])?;
    Some(Size { cols, rows })
}

/// Parse a non-empty run of ASCII digits.
fn parse_u16(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// The terminal size: `ioctl` first, the cursor probe as a fallback.
///
/// # Errors
///
/// Returns an error if both methods fail, or if the terminal is too small
/// to hold one text row above the status bar.
pub fn window_size(out: &mut impl Write, input: &mut impl ByteSource) -> io::Result<Size> {
    let size = if let Some(size) = get_size() {
        tracing::debug!(cols = size.cols, rows = size.rows, "window size from ioctl");
        size
    } else {
        let size = probe_size(out, input)?;
        tracing::debug!(cols = size.cols, rows = size.rows, "window size from cursor probe");
        size
    };

    if size.rows < 2 || size.cols == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("terminal too small ({}x{})", size.cols, size.rows),
        ));
    }
    Ok(size)
}

// ─── TtyWriter ──────────────────────────────────────────────────────────────

/// Unbuffered writer over file descriptor 1.
///
/// Each `write` call is exactly one `write(2)`. `io::Stdout` is line
/// buffered and would split a frame at its newlines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TtyWriter;

impl TtyWriter {
    /// A writer over the process's stdout.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl Write for TtyWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                data.as_ptr().cast::<libc::c_void>(),
                data.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for TtyWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        io::stdout().write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

// ─── Restore Hooks ──────────────────────────────────────────────────────────

/// Global backup of the original termios.
///
/// Shared by the [`RawMode`] guard, the `atexit` hook and the panic hook,
/// none of which can reach the others. Behind a [`Mutex`], not `static mut`.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup, at most once.
///
/// Best-effort: teardown errors are ignored.
#[cfg(unix)]
fn restore_termios_from_backup() {
    let original = TERMIOS_BACKUP.lock().ok().and_then(|mut guard| guard.take());
    if let Some(original) = original {
        unsafe {
            let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original);
        }
        tracing::debug!("terminal attributes restored");
    }
}

#[cfg(not(unix))]
fn restore_termios_from_backup() {}

#[cfg(unix)]
extern "C" fn restore_at_exit() {
    restore_termios_from_backup();
}

/// Reset sequence written by the panic hook: attributes off, clear, home,
/// show the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[2J\x1b[H\x1b[?25h";

static HOOKS_INSTALLED: Once = Once::new();

/// Install the `atexit` and panic restore hooks, once per process.
fn install_restore_hooks() {
    HOOKS_INSTALLED.call_once(|| {
        #[cfg(unix)]
        unsafe {
            if libc::atexit(restore_at_exit) != 0 {
                tracing::warn!("could not register atexit terminal restore");
            }
        }

        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            restore_termios_from_backup();
            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held.
fn emergency_restore() {
    let _ = TtyWriter.write_all(EMERGENCY_RESTORE);
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// RAII guard for raw terminal mode.
///
/// [`enable`](Self::enable) switches stdin's terminal to raw mode; the
/// original attributes come back when the guard is dropped, when the
/// process calls `exit()`, or when it panics.
///
/// # Example
///
/// ```no_run
/// use n_term::terminal::RawMode;
///
/// let raw = RawMode::enable(1)?;
/// // ... render frames, read keys ...
/// drop(raw); // terminal restored
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct RawMode {
    active: bool,
}

impl RawMode {
    /// Enter raw mode with a read timeout of `timeout_ds` deciseconds.
    ///
    /// Disables break-to-SIGINT, CR→NL translation, parity checking,
    /// 8th-bit stripping, XON/XOFF, output post-processing, echo,
    /// canonical mode, extended input processing and signal keys. Forces
    /// 8-bit characters. `VMIN = 0` with `VTIME = timeout_ds` makes every
    /// `read()` return after at most that long.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin is not a terminal or termios calls fail.
    #[cfg(unix)]
    pub fn enable(timeout_ds: u8) -> io::Result<Self> {
        let fd = libc::STDIN_FILENO;

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(termios);
        }
        install_restore_hooks();

        termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        termios.c_oflag &= !libc::OPOST;
        termios.c_cflag |= libc::CS8;
        termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        termios.c_cc[libc::VMIN] = 0;
        termios.c_cc[libc::VTIME] = timeout_ds;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            let err = io::Error::last_os_error();
            restore_termios_from_backup();
            return Err(err);
        }

        tracing::debug!(timeout_ds, "raw mode enabled");
        Ok(Self { active: true })
    }

    #[cfg(not(unix))]
    pub fn enable(_timeout_ds: u8) -> io::Result<Self> {
        install_restore_hooks();
        Ok(Self { active: true })
    }

    /// Whether this guard still holds the terminal in raw mode.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Put the original attributes back, flushing pending output first.
    ///
    /// Idempotent, and a no-op if an exit or panic hook already restored.
    pub fn restore(&mut self) {
        if self.is_active() {
            restore_termios_from_backup();
            self.active = false;
        }
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        self.restore();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScriptedInput;
    use pretty_assertions::assert_eq;

    // ── Cursor report parsing ─────────────────────────────────────────

    #[test]
    fn parse_report() {
        assert_eq!(
            parse_cursor_report(b"\x1b[24;80"),
            Some(Size { cols: 80, rows: 24 })
        );
    }

    #[test]
    fn parse_report_rejects_missing_prefix() {
        assert_eq!(parse_cursor_report(b"24;80"), None);
    }

    #[test]
    fn parse_report_rejects_missing_separator() {
        assert_eq!(parse_cursor_report(b"\x1b[2480"), None);
    }

    #[test]
    fn parse_report_rejects_empty_fields() {
        assert_eq!(parse_cursor_report(b"\x1b[;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24;"), None);
    }

    #[test]
    fn parse_report_rejects_junk() {
        assert_eq!(parse_cursor_report(b"\x1b[2x;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[99999;80"), None);
    }

    // ── Cursor probe ──────────────────────────────────────────────────

    #[test]
    fn probe_writes_query_and_reads_reply() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::from_bytes(b"\x1b[10;20Rx");
        let size = probe_size(&mut out, &mut input).unwrap();
        assert_eq!(size, Size { cols: 20, rows: 10 });
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
        // The byte after `R` is left alone.
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn probe_without_reply_fails() {
        let mut out = Vec::new();
        let mut input = ScriptedInput::new().timeout();
        let err = probe_size(&mut out, &mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn probe_stops_after_max_reply_length() {
        let mut out = Vec::new();
        let junk = [b'1'; 40];
        let mut input = ScriptedInput::from_bytes(&junk);
        assert!(probe_size(&mut out, &mut input).is_err());
        assert_eq!(input.remaining(), 40 - REPORT_MAX);
    }

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_shows_cursor_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[2J"), "must clear the screen");
        assert!(s.ends_with("\x1b[?25h"));
    }

    // ── RawMode ─────────────────────────────────────────────────────

    #[cfg(unix)]
    fn current_termios() -> libc::termios {
        let mut t: libc::termios = unsafe { std::mem::zeroed() };
        assert_eq!(unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut t) }, 0);
        t
    }

    #[cfg(unix)]
    #[test]
    fn enable_fails_without_a_tty() {
        if is_tty() {
            return;
        }
        assert!(RawMode::enable(1).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn restore_brings_back_original_attributes() {
        if !is_tty() {
            return;
        }
        let before = current_termios();

        let mut raw = RawMode::enable(1).unwrap();
        let during = current_termios();
        assert_eq!(during.c_lflag & libc::ECHO, 0);
        assert_eq!(during.c_lflag & libc::ICANON, 0);
        assert_eq!(during.c_cc[libc::VMIN], 0);
        assert_eq!(during.c_cc[libc::VTIME], 1);

        raw.restore();
        assert!(!raw.is_active());
        let after = current_termios();
        assert_eq!(after.c_iflag, before.c_iflag);
        assert_eq!(after.c_oflag, before.c_oflag);
        assert_eq!(after.c_cflag, before.c_cflag);
        assert_eq!(after.c_lflag, before.c_lflag);
        assert_eq!(after.c_cc, before.c_cc);

        // Second restore and the drop are no-ops. Kept in one test so no
        // two tests hold raw mode at the same time.
        raw.restore();
        drop(raw);
        assert_eq!(current_termios().c_lflag, before.c_lflag);
    }
}
