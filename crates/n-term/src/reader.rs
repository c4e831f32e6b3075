// SPDX-License-Identifier: MIT
//
// Stdin byte source: one byte at a time, with a read timeout.
//
// Safety: `StdinSource` calls `read(2)` on fd 0 into a one-byte stack
// buffer. That is the only unsafe block in this module.
#![allow(unsafe_code)]
//
// Raw mode configures the terminal with VMIN = 0 and VTIME = 1, so a
// `read()` on stdin returns after at most 100 ms even if no key was
// pressed. That timeout is what resolves the ESC ambiguity: a lone ESC
// followed by silence is the Escape key, an ESC followed by `[A` within
// the window is an arrow.
//
// The decoder only needs "give me the next byte, or tell me none came in
// time", so that is the whole interface. Tests drive the decoder and the
// event loop with a `ScriptedInput` instead of a terminal.

use std::collections::VecDeque;
use std::io;

/// A source of input bytes with a bounded wait.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// Returns `Ok(None)` when the read timed out with nothing available.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── StdinSource ────────────────────────────────────────────────────────────

/// Reads single bytes straight from file descriptor 0.
///
/// Goes through `read(2)` rather than `io::stdin()` so no userspace buffer
/// sits between the terminal and the decoder: a byte the decoder did not
/// ask for stays in the kernel's queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    /// Create a source over the process's stdin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        loop {
            let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
            match n {
                1 => return Ok(Some(byte)),
                0 => return Ok(None),
                _ => {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        // Cygwin and some BSDs report the VTIME expiry as EAGAIN.
                        io::ErrorKind::WouldBlock => return Ok(None),
                        io::ErrorKind::Interrupted => {}
                        _ => return Err(err),
                    }
                }
            }
        }
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

// ─── ScriptedInput ──────────────────────────────────────────────────────────

/// A replayable input script: bytes and explicit read timeouts.
///
/// Once the script is used up every read fails with `UnexpectedEof`, so a
/// test that forgets to quit ends with an error instead of spinning.
///
/// ```
/// use n_term::reader::{ByteSource, ScriptedInput};
///
/// let mut input = ScriptedInput::new().bytes(b"\x1b").timeout();
/// assert_eq!(input.read_byte()?, Some(0x1b));
/// assert_eq!(input.read_byte()?, None);
/// assert!(input.read_byte().is_err());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    script: VecDeque<Option<u8>>,
}

impl ScriptedInput {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A script holding `data`.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::new().bytes(data)
    }

    /// Append bytes that arrive back to back.
    #[must_use]
    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.script.extend(data.iter().copied().map(Some));
        self
    }

    /// Append one read that times out with nothing available.
    #[must_use]
    pub fn timeout(mut self) -> Self {
        self.script.push_back(None);
        self
    }

    /// Entries (bytes and timeouts) not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.script.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "input script exhausted")
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
