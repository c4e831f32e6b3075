//! Viewer options.
//!
//! The viewer has no runtime configuration surface: no flags, no
//! environment variables, no config file. The handful of tunables live
//! here with their defaults so the renderer and the binary read them from
//! one place instead of scattering literals.
//!
//! | Field             | Default                      |
//! |-------------------|------------------------------|
//! | `status_timeout`  | 5 s                          |
//! | `filename_width`  | 20 bytes                     |
//! | `startup_message` | `HELP: press CTRL+Q to quit` |
//! | `empty_name`      | `[no file]`                  |

use std::time::Duration;

/// Tunables for rendering the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// A status message older than this is dropped at the next render.
    pub status_timeout: Duration,
    /// Filenames are cut to this many bytes before the status line is
    /// composed.
    pub filename_width: usize,
    /// Message shown in the status bar when the viewer starts.
    pub startup_message: &'static str,
    /// Stand-in for the filename when no file was opened.
    pub empty_name: &'static str,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            status_timeout: Duration::from_secs(5),
            filename_width: 20,
            startup_message: "HELP: press CTRL+Q to quit",
            empty_name: "[no file]",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
