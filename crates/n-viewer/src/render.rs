//! Frame composition.
//!
//! Turns a [`Document`] seen through a [`Viewport`] into the bytes of one
//! frame body. The body is appended to an [`OutputBuffer`]; the event loop
//! owns cursor hiding, homing and final caret placement around it.
//!
//! A body is `text_rows` text rows followed by one status row:
//!
//! ```text
//! ESC[K alpha \r\n
//! ESC[K beta  \r\n
//! ESC[K ~     \r\n
//! ...
//! ESC[7m fname - 3 lines    l ESC[m
//! ```
//!
//! Text rows are cut to `cols - 1` bytes so the terminal never auto-wraps.
//! The status row is padded with spaces to exactly `cols` and carries no
//! terminator, so the screen never scrolls.

use std::io::{self, Write};
use std::time::Instant;

use n_term::ansi;
use n_term::output::OutputBuffer;

use crate::document::Document;
use crate::options::Options;
use crate::viewport::Viewport;

/// Marker drawn on text rows past the end of the document.
const TILDE: &[u8] = b"~";

/// Compose one complete frame body.
///
/// Takes the document mutably because an expired status message is dropped
/// here, as of `now`.
///
/// # Errors
///
/// Returns an error if the frame does not fit in `buf`.
pub fn draw_frame(
    buf: &mut OutputBuffer,
    doc: &mut Document,
    vp: &Viewport,
    opts: &Options,
    now: Instant,
) -> io::Result<()> {
    draw_rows(buf, doc, vp)?;
    draw_status_bar(buf, doc, vp, opts, now)
}

/// Draw the text area: one row per visible document line, `~` past the end.
///
/// # Errors
///
/// Returns an error if the rows do not fit in `buf`.
pub fn draw_rows(buf: &mut OutputBuffer, doc: &Document, vp: &Viewport) -> io::Result<()> {
    let width = usize::from(vp.cols()).saturating_sub(1);
    for y in 0..usize::from(vp.text_rows()) {
        ansi::clear_line(buf)?;
        match doc.line(vp.line_offset() + y) {
            Some(line) if line.is_empty() => {}
            Some(line) => buf.write_all(&line.as_bytes()[..line.len().min(width)])?,
            None => buf.write_all(TILDE)?,
        }
        buf.write_all(b"\r\n")?;
    }
    Ok(())
}

/// Draw the status row in reverse video.
///
/// Shows the status message while it is fresh, otherwise the file summary
/// from [`status_text`]. A message older than `opts.status_timeout` is
/// dropped before anything is drawn.
///
/// # Errors
///
/// Returns an error if the row does not fit in `buf`.
pub fn draw_status_bar(
    buf: &mut OutputBuffer,
    doc: &mut Document,
    vp: &Viewport,
    opts: &Options,
    now: Instant,
) -> io::Result<()> {
    doc.expire_status(now, opts.status_timeout);

    let cols = usize::from(vp.cols());
    let summary;
    let text = match doc.status_message() {
        Some(msg) => truncate(msg.text().as_bytes(), cols),
        None => {
            summary = status_text(doc, vp, opts);
            summary.as_slice()
        }
    };

    ansi::inverse_on(buf)?;
    buf.write_all(text)?;
    buf.fill(b' ', cols - text.len())?;
    ansi::inverse_off(buf)
}

/// The file summary shown when no status message is active:
///
/// `<name> - <N> lines    line: <line_offset + cy>  column: <cx>`
///
/// The name is cut to `opts.filename_width` bytes first, then the whole
/// line is cut to the screen width.
#[must_use]
pub fn status_text(doc: &Document, vp: &Viewport, opts: &Options) -> Vec<u8> {
    let name = doc.filename().unwrap_or(opts.empty_name).as_bytes();
    let mut text = truncate(name, opts.filename_width).to_vec();
    let summary = format!(
        " - {} lines    line: {}  column: {}",
        doc.line_count(),
        vp.caret_line(),
        vp.cx()
    );
    text.extend_from_slice(summary.as_bytes());
    text.truncate(usize::from(vp.cols()));
    text
}

fn truncate(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[..bytes.len().min(max)]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use n_term::input::Key;
    use n_term::terminal::Size;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const SIZE: Size = Size { cols: 20, rows: 10 };

    fn doc(text: &str, name: Option<&str>) -> Document {
        Document::from_reader(name.map(String::from), text.as_bytes()).unwrap()
    }

    fn frame(doc: &mut Document, vp: &Viewport, now: Instant) -> Vec<u8> {
        let mut buf = OutputBuffer::for_screen(SIZE.rows, SIZE.cols);
        draw_frame(&mut buf, doc, vp, &Options::default(), now).unwrap();
        buf.as_bytes().to_vec()
    }

    /// Split a body into its text rows (without `ESC[K`) and the status row.
    fn split(body: &[u8]) -> (Vec<String>, String) {
        let text = String::from_utf8_lossy(body).into_owned();
        let mut rows: Vec<String> = text.split("\r\n").map(String::from).collect();
        let status = rows.pop().unwrap();
        let rows = rows
            .into_iter()
            .map(|r| r.strip_prefix("\x1b[K").unwrap().to_owned())
            .collect();
        (rows, status)
    }

    fn inverse(text: &str) -> String {
        format!("\x1b[7m{text}\x1b[m")
    }

    // -- Text rows ----------------------------------------------------------

    #[test]
    fn frame_has_text_rows_then_status_row() {
        let mut d = doc("alpha\nbeta\ngamma\n", Some("fname"));
        let (rows, status) = split(&frame(&mut d, &Viewport::new(SIZE), Instant::now()));
        assert_eq!(rows.len(), 9);
        assert!(status.starts_with("\x1b[7m"));
        assert!(status.ends_with("\x1b[m"));
    }

    #[test]
    fn lines_then_tildes() {
        let mut d = doc("alpha\nbeta\ngamma\n", Some("fname"));
        let (rows, _) = split(&frame(&mut d, &Viewport::new(SIZE), Instant::now()));
        assert_eq!(&rows[..4], &["alpha", "beta", "gamma", "~"]);
        assert!(rows[3..].iter().all(|r| r == "~"));
    }

    #[test]
    fn empty_document_is_all_tildes() {
        let mut d = Document::new();
        let (rows, _) = split(&frame(&mut d, &Viewport::new(SIZE), Instant::now()));
        assert_eq!(rows, vec!["~"; 9]);
    }

    #[test]
    fn long_line_cut_to_width_minus_one() {
        let mut d = doc("abcdefghijklmnopqrstuvwxyz\n", None);
        let (rows, _) = split(&frame(&mut d, &Viewport::new(SIZE), Instant::now()));
        assert_eq!(rows[0], "abcdefghijklmnopqrs");
        assert_eq!(rows[0].len(), 19);
    }

    #[test]
    fn rows_follow_line_offset() {
        let mut d = doc("alpha\nbeta\ngamma\n", None);
        let mut vp = Viewport::new(SIZE);
        for _ in 0..9 {
            vp.handle_key(Key::ArrowDown, d.line_count());
        }
        let (rows, _) = split(&frame(&mut d, &vp, Instant::now()));
        assert_eq!(&rows[..3], &["beta", "gamma", "~"]);
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let d = Document::from_reader(None, &b"caf\xe9\n"[..]).unwrap();
        let mut buf = OutputBuffer::for_screen(SIZE.rows, SIZE.cols);
        draw_rows(&mut buf, &d, &Viewport::new(SIZE)).unwrap();
        assert!(buf.as_bytes().starts_with(b"\x1b[Kcaf\xe9\r\n"));
    }

    #[test]
    fn blank_line_is_cleared_not_tilded() {
        let mut d = doc("alpha\n\ngamma\n", None);
        let (rows, _) = split(&frame(&mut d, &Viewport::new(SIZE), Instant::now()));
        assert_eq!(&rows[..4], &["alpha", "", "gamma", "~"]);
    }

    // -- Status row ---------------------------------------------------------

    #[test]
    fn status_text_without_file() {
        let d = Document::new();
        let vp = Viewport::new(Size { cols: 80, rows: 10 });
        assert_eq!(
            String::from_utf8(status_text(&d, &vp, &Options::default())).unwrap(),
            "[no file] - 0 lines    line: 0  column: 0"
        );
    }

    #[test]
    fn status_text_truncated_to_width() {
        let d = doc("alpha\nbeta\ngamma\n", Some("fname"));
        let text = status_text(&d, &Viewport::new(SIZE), &Options::default());
        assert_eq!(text, b"fname - 3 lines    l");
    }

    #[test]
    fn status_text_cuts_filename_first() {
        let d = doc("x\n", Some("a-very-long-file-name-indeed.txt"));
        let vp = Viewport::new(Size { cols: 80, rows: 10 });
        let text = status_text(&d, &vp, &Options::default());
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "a-very-long-file-nam - 1 lines    line: 0  column: 0"
        );
    }

    #[test]
    fn status_text_reports_caret() {
        let d = doc("a\nb\nc\nd\n", None);
        let mut vp = Viewport::new(Size { cols: 80, rows: 10 });
        vp.handle_key(Key::ArrowDown, 4);
        vp.handle_key(Key::ArrowDown, 4);
        vp.handle_key(Key::ArrowRight, 4);
        let text = status_text(&d, &vp, &Options::default());
        assert!(text.ends_with(b"line: 2  column: 1"));
    }

    #[test]
    fn fresh_message_is_shown_and_padded() {
        let now = Instant::now();
        let mut d = Document::new();
        d.set_status_message_at("HELP: press CTRL+Q to quit", now);
        let (_, status) = split(&frame(&mut d, &Viewport::new(SIZE), now));
        assert_eq!(status, inverse("HELP: press CTRL+Q t"));
    }

    #[test]
    fn short_message_padded_to_width() {
        let now = Instant::now();
        let mut d = Document::new();
        d.set_status_message_at("hi", now);
        let (_, status) = split(&frame(&mut d, &Viewport::new(SIZE), now));
        assert_eq!(status, inverse(&format!("hi{}", " ".repeat(18))));
    }

    #[test]
    fn stale_message_is_dropped_before_drawing() {
        let now = Instant::now();
        let mut d = Document::new();
        d.set_status_message_at("HELP", now);
        let later = now + Duration::from_secs(6);
        let (_, status) = split(&frame(&mut d, &Viewport::new(SIZE), later));
        assert_eq!(status, inverse("[no file] - 0 lines "));
        assert!(d.status_message().is_none());
    }

    #[test]
    fn message_kept_at_exactly_timeout() {
        let now = Instant::now();
        let mut d = Document::new();
        d.set_status_message_at("HELP", now);
        frame(&mut d, &Viewport::new(SIZE), now + Duration::from_secs(5));
        assert!(d.status_message().is_some());
    }

    #[test]
    fn status_row_is_exactly_cols_wide() {
        for cols in [1u16, 2, 9, 20, 41, 120] {
            let size = Size { cols, rows: 4 };
            let mut d = doc("alpha\n", Some("fname"));
            let mut buf = OutputBuffer::for_screen(size.rows, size.cols);
            draw_status_bar(
                &mut buf,
                &mut d,
                &Viewport::new(size),
                &Options::default(),
                Instant::now(),
            )
            .unwrap();
            let body = buf.as_bytes();
            let inner = &body[4..body.len() - 3];
            assert_eq!(inner.len(), usize::from(cols), "cols = {cols}");
        }
    }

    // -- Capacity -----------------------------------------------------------

    #[test]
    fn frame_fits_in_screen_sized_buffer() {
        let text = "x".repeat(400) + "\n";
        let mut d = doc(&text.repeat(20), Some(&"n".repeat(64)));
        let mut buf = OutputBuffer::for_screen(SIZE.rows, SIZE.cols);
        draw_frame(
            &mut buf,
            &mut d,
            &Viewport::new(SIZE),
            &Options::default(),
            Instant::now(),
        )
        .unwrap();
        assert!(buf.len() <= buf.capacity());
    }

    #[test]
    fn overflow_surfaces_as_io_error() {
        let mut d = doc("alpha\n", None);
        let mut buf = OutputBuffer::with_capacity(16);
        let err = draw_frame(
            &mut buf,
            &mut d,
            &Viewport::new(SIZE),
            &Options::default(),
            Instant::now(),
        )
        .unwrap_err();
        assert!(
            err.get_ref()
                .is_some_and(|e| e.is::<n_term::output::CapacityExceeded>())
        );
        assert!(buf.len() <= 16);
    }
}
