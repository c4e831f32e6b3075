// SPDX-License-Identifier: MIT
//
// Event loop.
//
// One frame, one key, repeat. Each iteration:
//
//   1. hide the cursor and home it          (two small writes)
//   2. clear the frame buffer
//   3. let the application paint the body
//   4. flush the body                       (one write)
//   5. position the cursor and show it      (one small write)
//   6. block for one key
//   7. hand the key to the application, which mutates state or quits
//
// The cursor is hidden while the body is drawn so the caret does not
// flicker across the cells being painted, and it is positioned only after
// the body has been flushed so the move cannot be interleaved with the
// drawn cells.
//
// There is no concurrency and no tick: the only blocking point is the
// read of the next key, and the frame for state N is fully written before
// any byte of frame N+1 is composed.
//
// The loop is generic over its output writer and input byte source, so
// tests drive it with a `Vec<u8>` and a `ScriptedInput`.

use std::io::{self, Write};

use crate::ansi;
use crate::input::{self, Key};
use crate::output::{self, OutputBuffer};
use crate::reader::ByteSource;
use crate::terminal::Size;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Clear the screen and leave the loop.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`paint`](App::paint), then [`cursor`](App::cursor),
/// then blocks for a key and calls [`on_key`](App::on_key).
pub trait App {
    /// Compose the frame body into `buf`.
    ///
    /// The buffer has been cleared and the cursor homed before this call.
    /// Takes `&mut self` so transient state (an expiring status message)
    /// can be updated while drawing.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame does not fit in the buffer.
    fn paint(&mut self, buf: &mut OutputBuffer) -> io::Result<()>;

    /// Where the caret goes once the body is on screen, 0-indexed `(x, y)`.
    fn cursor(&self) -> (u16, u16);

    /// Handle one decoded key.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: Key) -> Action;
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Timing and sizing for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Terminal read timeout in deciseconds (`VTIME`). Bounds how long an
    /// ESC waits for the rest of its sequence. Default: 1 (100 ms).
    pub read_timeout_ds: u8,
    /// Frame buffer bytes reserved per screen cell. Default: 8.
    pub bytes_per_cell: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            read_timeout_ds: 1,
            bytes_per_cell: output::BYTES_PER_CELL,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The frame/key loop.
///
/// Owns the output writer, the input source and the frame buffer. Raw mode
/// is the caller's business: enable it before [`run`](Self::run) and keep
/// the guard alive until after.
///
/// # Example
///
/// ```no_run
/// use n_term::event_loop::{Action, App, EventLoop, LoopConfig};
/// use n_term::input::Key;
/// use n_term::output::OutputBuffer;
/// use n_term::reader::StdinSource;
/// use n_term::terminal::{RawMode, Size, TtyWriter};
///
/// struct Hello;
///
/// impl App for Hello {
///     fn paint(&mut self, buf: &mut OutputBuffer) -> std::io::Result<()> {
///         buf.append(b"hello")?;
///         Ok(())
///     }
///     fn cursor(&self) -> (u16, u16) {
///         (0, 0)
///     }
///     fn on_key(&mut self, _key: Key) -> Action {
///         Action::Quit
///     }
/// }
///
/// let config = LoopConfig::default();
/// let _raw = RawMode::enable(config.read_timeout_ds)?;
/// let size = Size { cols: 80, rows: 24 };
/// let mut event_loop = EventLoop::new(TtyWriter::new(), StdinSource::new(), size, config);
/// event_loop.run(&mut Hello)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop<W, R> {
    out: W,
    input: R,
    frame: OutputBuffer,
}

impl<W: Write, R: ByteSource> EventLoop<W, R> {
    /// Create a loop for a screen of `size`, allocating the frame buffer
    /// once at `rows × cols × bytes_per_cell`.
    pub fn new(out: W, input: R, size: Size, config: LoopConfig) -> Self {
        let capacity = output::capacity_for(size.rows, size.cols, config.bytes_per_cell);
        tracing::debug!(capacity, "frame buffer allocated");
        Self {
            out,
            input,
            frame: OutputBuffer::with_capacity(capacity),
        }
    }

    /// The frame buffer (holds the last frame body after a render).
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &OutputBuffer {
        &self.frame
    }

    /// The output writer.
    #[inline]
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.out
    }

    /// Give back the writer and the input source.
    pub fn into_parts(self) -> (W, R) {
        (self.out, self.input)
    }

    /// Clear the screen and home the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        ansi::clear_screen(&mut self.out)?;
        self.out.flush()
    }

    /// Draw one complete frame.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the frame overflows the buffer.
    pub fn render(&mut self, app: &mut impl App) -> io::Result<()> {
        ansi::cursor_hide(&mut self.out)?;
        ansi::cursor_home(&mut self.out)?;

        self.frame.clear();
        app.paint(&mut self.frame)?;
        self.frame.flush_to(&mut self.out)?;

        let (x, y) = app.cursor();
        let mut tail = Vec::with_capacity(24);
        ansi::cursor_to(&mut tail, x, y)?;
        ansi::cursor_show(&mut tail)?;
        self.out.write_all(&tail)?;
        self.out.flush()
    }

    /// Render one frame, wait for one key, and apply it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or reading input fails.
    pub fn step(&mut self, app: &mut impl App) -> io::Result<Action> {
        self.render(app)?;
        let key = input::read_key(&mut self.input)?;
        Ok(app.on_key(key))
    }

    /// Run until the application returns [`Action::Quit`].
    ///
    /// Clears the screen before the first frame and again on quit.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or reading input fails. The screen is
    /// left as-is; the caller decides how to report.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.clear_screen()?;
        loop {
            if self.step(app)? == Action::Quit {
                tracing::debug!("quit requested");
                return self.clear_screen();
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
