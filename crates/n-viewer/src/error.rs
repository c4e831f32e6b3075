//! Error taxonomy for the viewer.
//!
//! Every variant is fatal: the binary clears the screen, restores the
//! terminal, prints the error and exits non-zero. Nothing here is meant to
//! be recovered from. Recoverable conditions (a failed size ioctl, an
//! incomplete escape sequence, an expired status message) are handled where
//! they occur and never become an `Error`.

use std::io;
use std::path::PathBuf;

use n_term::output::CapacityExceeded;

/// A fatal viewer error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Switching the terminal to raw mode failed.
    #[error("failed to enter raw mode: {0}")]
    Terminal(#[source] io::Error),

    /// Neither the ioctl nor the cursor probe produced a usable size.
    #[error("failed to determine window size: {0}")]
    WindowSize(#[source] io::Error),

    /// The file named on the command line could not be read.
    #[error("{}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A frame did not fit in the frame buffer.
    #[error(transparent)]
    Overflow(#[from] CapacityExceeded),

    /// Writing a frame or reading a key failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify an error surfaced by the event loop.
    ///
    /// A frame buffer overflow reaches the loop wrapped in an `io::Error`
    /// (the buffer is written through `io::Write`); unwrap it back into
    /// [`Error::Overflow`].
    #[must_use]
    pub fn from_loop(e: io::Error) -> Self {
        let overflow = e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<CapacityExceeded>())
            .copied();
        match overflow {
            Some(overflow) => Self::Overflow(overflow),
            None => Self::Io(e),
        }
    }
}

/// Result alias for viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_path() {
        let e = Error::Open {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(e.to_string(), "missing.txt: No such file or directory");
    }

    #[test]
    fn terminal_error_message() {
        let e = Error::Terminal(io::Error::other("not a tty"));
        assert_eq!(e.to_string(), "failed to enter raw mode: not a tty");
    }

    #[test]
    fn from_loop_recovers_overflow() {
        let overflow = CapacityExceeded {
            capacity: 8,
            requested: 9,
        };
        let e = Error::from_loop(io::Error::from(overflow));
        assert!(matches!(e, Error::Overflow(o) if o == overflow));
    }

    #[test]
    fn from_loop_keeps_other_io_errors() {
        let e = Error::from_loop(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(matches!(e, Error::Io(ref err) if err.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn overflow_display_is_transparent() {
        let e = Error::from(CapacityExceeded {
            capacity: 10,
            requested: 12,
        });
        assert_eq!(
            e.to_string(),
            "frame buffer capacity exceeded (12 of 10 bytes)"
        );
    }
}
