//! The document: an immutable sequence of lines plus status metadata.
//!
//! A [`Document`] is what the viewer shows: the lines of one file (or none),
//! the name it was opened under, and a transient status message.
//!
//! # Design choices
//!
//! - **Lines are bytes.** The file is never decoded as UTF-8. Every byte is
//!   one display column, so a line's length is also its width, and files in
//!   any encoding open without error.
//!
//! - **Terminators are stripped on load.** Any run of trailing `\n` / `\r`
//!   bytes is removed, so `\r\n` files display without stray carriage
//!   returns.
//!
//! - **Read-only after load.** Nothing in the viewer mutates the line store.
//!   Only the status message changes over the document's lifetime.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One line of the document, without its terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    chars: Vec<u8>,
}

impl Line {
    /// Build a line from raw bytes, stripping trailing `\n` / `\r`.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        let mut end = bytes.len();
        while end > 0 && matches!(bytes[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Self {
            chars: bytes[..end].to_vec(),
        }
    }

    /// The line's bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Length in bytes, which is also the display width.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the line is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// StatusMessage
// ---------------------------------------------------------------------------

/// A transient message for the status bar and the instant it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    /// The message text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// How long the message has been shown as of `now`.
    #[inline]
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.set_at)
    }

    /// Whether the message is older than `timeout` as of `now`.
    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        self.age(now) > timeout
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The lines being viewed, the file name, and the status message.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<Line>,
    filename: Option<String>,
    status: Option<StatusMessage>,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// An empty document with no file name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Open`] if the file cannot be opened or read.
    pub fn open(path: &Path) -> Result<Self> {
        let open_error = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(open_error)?;
        let lines = read_lines(BufReader::new(file)).map_err(open_error)?;
        tracing::debug!(path = %path.display(), lines = lines.len(), "document loaded");

        Ok(Self {
            lines,
            filename: Some(path.display().to_string()),
            status: None,
        })
    }

    /// Load a document from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_reader(filename: Option<String>, reader: impl BufRead) -> io::Result<Self> {
        Ok(Self {
            lines: read_lines(reader)?,
            filename,
            status: None,
        })
    }

    // -- Lines --------------------------------------------------------------

    /// Number of lines. An empty file has zero lines.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The line at `index`, if it exists.
    #[inline]
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// The name the document was opened under.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    // -- Status message -----------------------------------------------------

    /// Replace the status message, stamped with the current time.
    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.set_status_message_at(text, Instant::now());
    }

    /// Replace the status message with an explicit timestamp.
    pub fn set_status_message_at(&mut self, text: impl Into<String>, set_at: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            set_at,
        });
    }

    /// The current status message, expired or not.
    #[inline]
    #[must_use]
    pub const fn status_message(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Drop the status message if it is older than `timeout` as of `now`.
    ///
    /// Returns `true` if a message was dropped.
    pub fn expire_status(&mut self, now: Instant, timeout: Duration) -> bool {
        if self
            .status
            .as_ref()
            .is_some_and(|m| m.is_expired(now, timeout))
        {
            self.status = None;
            tracing::trace!("status message expired");
            return true;
        }
        false
    }
}

/// Split a stream into lines, stripping terminators.
///
/// A final line without a trailing newline still counts as a line.
fn read_lines(mut reader: impl BufRead) -> io::Result<Vec<Line>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines.push(Line::new(&buf));
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
