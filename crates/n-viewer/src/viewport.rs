//! Viewport: caret position and scroll offset over a document.
//!
//! The screen is split into a text area of `rows - 1` rows and one status
//! row. The viewport tracks where the caret sits inside the text area and
//! which document line is drawn on its first row.
//!
//! ```text
//!            cols
//!   ┌────────────────────┐
//!   │ line_offset + 0    │  ▲
//!   │ line_offset + 1    │  │ text_rows = rows - 1
//!   │ ...        ▌(cx,cy)│  │
//!   │ line_offset + n    │  ▼
//!   │ status bar         │
//!   └────────────────────┘
//! ```
//!
//! The caret is clamped to the rectangle, never to the length of the line
//! under it. Moving up scrolls back one line whenever the caret lands on
//! the top text row; moving down scrolls only once the caret is already
//! parked on the bottom text row.
//!
//! Invariants, held after every call:
//!
//! - `cx < cols`
//! - `cy < text_rows`
//! - `line_offset <= line_count`

use n_term::input::Key;
use n_term::terminal::Size;

/// Caret and scroll state for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    cols: u16,
    text_rows: u16,
    cx: u16,
    cy: u16,
    line_offset: usize,
}

impl Viewport {
    /// A viewport for a screen of `size`, caret at the origin.
    ///
    /// The last screen row is reserved for the status bar. Callers guarantee
    /// at least two rows and one column; smaller sizes are clamped so the
    /// invariants still hold.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            cols: size.cols.max(1),
            text_rows: size.rows.saturating_sub(1).max(1),
            cx: 0,
            cy: 0,
            line_offset: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Screen width in columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Height of the text area (screen rows minus the status row).
    #[inline]
    #[must_use]
    pub const fn text_rows(&self) -> u16 {
        self.text_rows
    }

    /// Caret column.
    #[inline]
    #[must_use]
    pub const fn cx(&self) -> u16 {
        self.cx
    }

    /// Caret row within the text area.
    #[inline]
    #[must_use]
    pub const fn cy(&self) -> u16 {
        self.cy
    }

    /// Index of the document line drawn on the first text row.
    #[inline]
    #[must_use]
    pub const fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// Caret position as `(x, y)` screen coordinates.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> (u16, u16) {
        (self.cx, self.cy)
    }

    /// The document line under the caret (may be past the end).
    #[inline]
    #[must_use]
    pub const fn caret_line(&self) -> usize {
        self.line_offset + self.cy as usize
    }

    // -- Movement -----------------------------------------------------------

    /// Apply a navigation key. Keys that don't move anything are ignored.
    ///
    /// `line_count` bounds the scroll offset; scrolling may go one full
    /// screen past the last line, leaving only `~` rows visible.
    pub fn handle_key(&mut self, key: Key, line_count: usize) {
        let page = usize::from(self.text_rows);
        match key {
            Key::ArrowLeft => self.cx = self.cx.saturating_sub(1),
            Key::ArrowRight => {
                if self.cx + 1 < self.cols {
                    self.cx += 1;
                }
            }
            Key::ArrowUp => {
                self.cy = self.cy.saturating_sub(1);
                if self.cy == 0 {
                    self.line_offset = self.line_offset.saturating_sub(1);
                }
            }
            Key::ArrowDown => {
                if self.cy + 1 < self.text_rows {
                    self.cy += 1;
                } else {
                    self.line_offset = (self.line_offset + 1).min(line_count);
                }
            }
            Key::PageUp => self.line_offset = self.line_offset.saturating_sub(page),
            Key::PageDown => self.line_offset = (self.line_offset + page).min(line_count),
            Key::Home => self.cx = 0,
            Key::End => self.cx = self.cols - 1,
            _ => return,
        }
        tracing::trace!(
            ?key,
            cx = self.cx,
            cy = self.cy,
            line_offset = self.line_offset,
            "viewport moved"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
