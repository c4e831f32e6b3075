// SPDX-License-Identifier: MIT
//
// n-view: a minimal full-screen terminal text viewer.
//
// This is the binary that wires the two crates together:
//
//   n-term   → raw mode, window size, frame buffer, key decoding, event loop
//   n-viewer → document, viewport, frame composition, errors
//
// The Viewer struct implements n-term's App trait. Each keypress flows
// through:
//
//   stdin → read_key → on_key → viewport mutation (or quit)
//   paint → render::draw_frame → OutputBuffer → one write(2)
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 1 rows, `~` past the end
//   ├──────────────────────────────┤
//   │ status bar (INVERSE)         │  ← 1 row: message or file summary
//   └──────────────────────────────┘
//
// Usage: `n-view [file]`. Further arguments are ignored.

use std::env;
use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use n_term::ansi;
use n_term::event_loop::{Action, App, EventLoop, LoopConfig};
use n_term::input::Key;
use n_term::output::OutputBuffer;
use n_term::reader::StdinSource;
use n_term::terminal::{self, RawMode, Size, TtyWriter};

use n_viewer::document::Document;
use n_viewer::options::Options;
use n_viewer::render;
use n_viewer::viewport::Viewport;
use n_viewer::{Error, Result};

// ─── Viewer ─────────────────────────────────────────────────────────────────

/// The application state driven by the event loop.
struct Viewer {
    document: Document,
    viewport: Viewport,
    options: Options,
}

impl Viewer {
    fn new(document: Document, size: Size, options: Options) -> Self {
        Self {
            document,
            viewport: Viewport::new(size),
            options,
        }
    }
}

impl App for Viewer {
    fn paint(&mut self, buf: &mut OutputBuffer) -> io::Result<()> {
        render::draw_frame(
            buf,
            &mut self.document,
            &self.viewport,
            &self.options,
            Instant::now(),
        )
    }

    fn cursor(&self) -> (u16, u16) {
        self.viewport.cursor()
    }

    fn on_key(&mut self, key: Key) -> Action {
        if key == Key::Escape || key.is_ctrl(b'q') {
            return Action::Quit;
        }
        self.viewport.handle_key(key, self.document.line_count());
        Action::Continue
    }
}

// ─── Startup ────────────────────────────────────────────────────────────────

/// Enter raw mode, load the document and run until quit.
///
/// The raw mode guard lives for the whole call, so the terminal is restored
/// before this returns, on success and on error alike.
fn run(path: Option<&Path>) -> Result<()> {
    let config = LoopConfig::default();
    let options = Options::default();

    let _raw = RawMode::enable(config.read_timeout_ds).map_err(Error::Terminal)?;

    let mut out = TtyWriter::new();
    let mut input = StdinSource::new();
    let size = terminal::window_size(&mut out, &mut input).map_err(Error::WindowSize)?;

    let mut document = match path {
        Some(path) => Document::open(path)?,
        None => Document::new(),
    };
    document.set_status_message(options.startup_message);

    let mut viewer = Viewer::new(document, size, options);
    EventLoop::new(out, input, size, config)
        .run(&mut viewer)
        .map_err(Error::from_loop)
}

#[cfg(feature = "trace-log")]
fn init_logging() {
    let path = env::temp_dir().join("n-view.log");
    let Ok(file) = std::fs::File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();
    tracing::debug!(path = %path.display(), "logging started");
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    #[cfg(feature = "trace-log")]
    init_logging();

    let path = env::args_os().nth(1);

    if let Err(e) = run(path.as_deref().map(Path::new)) {
        tracing::warn!(error = %e, "fatal error");
        let _ = ansi::clear_screen(&mut TtyWriter::new());
        eprintln!("n-view: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
