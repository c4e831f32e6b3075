// SPDX-License-Identifier: MIT
//
// n-term: terminal layer for n-view.
//
// Direct terminal control through raw termios and ANSI escape sequences:
// raw mode with guaranteed restore, window size discovery, a bounded frame
// buffer flushed in one write, a key decoder for the legacy CSI/SS3
// navigation sequences, and the frame/key loop that ties them together.
//
// No TUI framework sits underneath. Every byte sent to the terminal is
// accounted for, and every frame body reaches it in a single write().

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
