//! n-viewer: the viewer core for n-view.
//!
//! Everything between the terminal layer ([`n_term`]) and the binary:
//!
//! - [`document`]: the lines of the file being viewed and the status message
//! - [`viewport`]: caret position and scroll offset, driven by keys
//! - [`render`]: composes one frame body into an [`OutputBuffer`]
//! - [`options`]: rendering tunables and their defaults
//! - [`error`]: the fatal error taxonomy
//!
//! The crate performs no terminal I/O of its own. Rendering targets an
//! in-memory buffer, so every module is tested without a TTY.
//!
//! [`OutputBuffer`]: n_term::output::OutputBuffer

pub mod document;
pub mod error;
pub mod options;
pub mod render;
pub mod viewport;

pub use error::{Error, Result};
