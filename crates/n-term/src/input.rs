// SPDX-License-Identifier: MIT
//
// Terminal key decoder.
//
// Turns the raw stdin byte stream into one logical key per call. Plain
// bytes pass through untouched; an ESC byte starts a short look-ahead
// that recognises the legacy CSI and SS3 encodings of the navigation
// keys:
//
//   ESC [ A/B/C/D        arrows
//   ESC [ H / ESC [ F    home / end (xterm)
//   ESC O H / ESC O F    home / end (application cursor mode)
//   ESC [ n ~            vt220 editing keys, n = 1/7 home, 3 delete,
//                        4/8 end, 5 page up, 6 page down
//
// # The ESC ambiguity
//
// A bare ESC byte could be the Escape key or the start of a sequence.
// The terminal is configured with a 100 ms read timeout, so after ESC we
// read the follow-up bytes one at a time and stop as soon as a read comes
// back empty. Anything we cannot classify, including an ESC that nothing
// follows, decodes to `Key::Escape`.
//
// The look-ahead is a flat decision over at most three bytes, and it
// reads only as many bytes as the sequence needs: the `~` of a vt220 key
// is consumed, but the byte after `ESC [ A` is left for the next call.

use std::io;

use crate::reader::ByteSource;

/// The escape byte.
pub const ESC: u8 = 0x1b;

/// The control-key byte for an ASCII letter (`ctrl(b'q')` is `0x11`).
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1f
}

// ─── Key ────────────────────────────────────────────────────────────────────

/// One decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that did not start an escape sequence, control bytes
    /// included (`Ctrl-Q` arrives as `Byte(0x11)`).
    Byte(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    /// The Escape key, or an escape sequence we do not recognise.
    Escape,
}

impl Key {
    /// Whether this is `Ctrl` + `letter`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Byte(b) if b == ctrl(letter))
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// Block until one key is available and decode it.
///
/// Read timeouts before the first byte are retried silently. After an ESC,
/// a timeout ends the look-ahead.
///
/// # Errors
///
/// Returns an error if reading from `src` fails.
pub fn read_key(src: &mut impl ByteSource) -> io::Result<Key> {
    let byte = loop {
        if let Some(b) = src.read_byte()? {
            break b;
        }
    };

    if byte != ESC {
        return Ok(Key::Byte(byte));
    }

    let mut seq = [0u8; 3];
    let mut len = 0;
    while len < seq.len() {
        match src.read_byte()? {
            Some(b) => {
                seq[len] = b;
                len += 1;
            }
            None => break,
        }
        if !wants_more(&seq[..len]) {
            break;
        }
    }

    let key = decode_escape(&seq[..len]);
    tracing::trace!(?key, seq = ?&seq[..len], "decoded escape sequence");
    Ok(key)
}

/// Whether the bytes read after ESC so far are a prefix that needs
/// another byte.
fn wants_more(seq: &[u8]) -> bool {
    match seq {
        [b'[' | b'O'] => true,
        // vt220 keys: `ESC [ n ~`, swallow the terminator.
        [b'[', d] => d.is_ascii_digit(),
        _ => false,
    }
}

/// Classify the bytes that followed an ESC.
///
/// Only the first two bytes decide; the third (usually `~`) never changes
/// the outcome.
#[must_use]
pub fn decode_escape(seq: &[u8]) -> Key {
    match seq {
        [b'[', second, ..] => match *second {
            b'A' => Key::ArrowUp,
            b'B' => Key::ArrowDown,
            b'C' => Key::ArrowRight,
            b'D' => Key::ArrowLeft,
            b'H' | b'1' | b'7' => Key::Home,
            b'F' | b'4' | b'8' => Key::End,
            b'3' => Key::Delete,
            b'5' => Key::PageUp,
            b'6' => Key::PageDown,
            _ => Key::Escape,
        },
        [b'O', b'H', ..] => Key::Home,
        [b'O', b'F', ..] => Key::End,
        _ => Key::Escape,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
