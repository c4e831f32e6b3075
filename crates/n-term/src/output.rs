// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// OutputBuffer accumulates every byte of a frame body in memory so the whole
// frame reaches the terminal in a single write() syscall. The terminal never
// sees a half-drawn screen, and the caret never flickers across intermediate
// positions.
//
// Unlike a plain Vec, the buffer has a hard ceiling fixed at startup. The
// capacity is sized from the screen (`rows × cols × 8`), which fits a full
// screen of text plus every escape sequence a single frame emits. Crossing
// the ceiling means the renderer produced something it should not have, so
// it is reported as an error, never silently truncated.

use std::error::Error;
use std::fmt;
use std::io::{self, Write};

/// Bytes reserved per screen cell when sizing a frame buffer.
pub const BYTES_PER_CELL: usize = 8;

/// Capacity for a frame buffer covering a `rows × cols` screen.
#[inline]
#[must_use]
pub const fn capacity_for(rows: u16, cols: u16, bytes_per_cell: usize) -> usize {
    rows as usize * cols as usize * bytes_per_cell
}

// ─── CapacityExceeded ───────────────────────────────────────────────────────

/// An append would have grown the buffer past its fixed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    /// Buffer capacity in bytes.
    pub capacity: usize,
    /// Length the buffer would have reached.
    pub requested: usize,
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame buffer capacity exceeded ({} of {} bytes)",
            self.requested, self.capacity
        )
    }
}

impl Error for CapacityExceeded {}

impl From<CapacityExceeded> for io::Error {
    fn from(e: CapacityExceeded) -> Self {
        Self::other(e)
    }
}

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A bounded byte buffer holding one frame for a single `write()` syscall.
///
/// Implements [`Write`] so the [`ansi`](crate::ansi) functions can compose
/// straight into it. An overflowing write fails with an `io::Error` whose
/// inner error is [`CapacityExceeded`].
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl OutputBuffer {
    /// Allocate a buffer that will never hold more than `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Allocate a buffer sized for a `rows × cols` screen.
    #[must_use]
    pub fn for_screen(rows: u16, cols: u16) -> Self {
        Self::with_capacity(capacity_for(rows, cols, BYTES_PER_CELL))
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The fixed capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Copy `data` onto the end of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] if `len + data.len() > capacity`. The
    /// buffer is left unchanged in that case.
    pub fn append(&mut self, data: &[u8]) -> Result<(), CapacityExceeded> {
        let requested = self.buf.len() + data.len();
        if requested > self.capacity {
            return Err(CapacityExceeded {
                capacity: self.capacity,
                requested,
            });
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Append `byte` `count` times (padding).
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] on overflow.
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<(), CapacityExceeded> {
        let requested = self.buf.len() + count;
        if requested > self.capacity {
            return Err(CapacityExceeded {
                capacity: self.capacity,
                requested,
            });
        }
        self.buf.resize(requested, byte);
        Ok(())
    }

    /// Reset the length to zero for the next frame (keeps the allocation).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated frame to `w` as one `write_all`.
    ///
    /// The buffer is not cleared; the next frame calls [`clear`](Self::clear)
    /// before composing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.append(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
