//! Source text and the cursor that walks it.
//!
//! The cursor is the only owner of "where are we" during a parse. It tracks
//! the absolute byte offset together with a 0-based row and column, and it
//! can be snapshotted and restored when a caller backtracks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A location in the input.
///
/// `offset` is a byte offset into the text. `row` and `col` are 0-based and
/// `col` counts chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Returns the position reached after consuming `matched` from here.
    pub fn after(self, matched: &str) -> Position {
        if matched.is_empty() {
            return self;
        }

        let offset = self.offset + matched.len();
        match matched.rfind('\n') {
            None => Position {
                offset,
                row: self.row,
                col: self.col + matched.chars().count(),
            },
            Some(last_newline) => Position {
                offset,
                row: self.row + matched.matches('\n').count(),
                col: matched[last_newline + 1..].chars().count(),
            },
        }
    }
}

/// Prints the 1-based `row.col (offset)` form used in reports.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.row + 1, self.col + 1, self.offset + 1)
    }
}

/// Monotonic reader over an immutable input buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: Position::default(),
        }
    }

    /// The whole input.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// The unread part of the input.
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos.offset == self.text.len()
    }

    /// Consumes `len` bytes and returns them. A zero length is a no-op.
    pub fn advance(&mut self, len: usize) -> &'a str {
        let start = self.pos.offset;
        let matched = &self.text[start..start + len];
        self.pos = self.pos.after(matched);
        matched
    }

    /// Moves back to a position previously returned by [`Cursor::position`].
    pub fn restore(&mut self, pos: Position) {
        debug_assert!(pos.offset <= self.text.len());
        self.pos = pos;
    }
}

/// Returns the text of the 0-based `row`, without its newline.
///
/// Rows are split on `\n` only, matching how the cursor counts them. A row
/// past the end yields an empty line.
pub fn line_at(text: &str, row: usize) -> &str {
    text.split('\n').nth(row).unwrap_or("")
}
