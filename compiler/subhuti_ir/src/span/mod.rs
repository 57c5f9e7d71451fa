//! Source locations.
//!
//! A [`Position`] is a byte index paired with a human line/column, and a
//! [`Span`] is a half-open pair of positions. Both are `Copy` and small; the
//! parser snapshots and restores them on every backtrack.

use std::fmt;
use std::ops::Range;

/// Returns `true` for the ECMAScript line terminators.
///
/// `\r\n` is a single terminator; callers that walk text char by char must
/// skip the `\n` that follows a `\r` (see [`Position::advance`]).
#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// A point in the source text.
///
/// - `index`: byte offset from the start of the text
/// - `line`: 1-based line number
/// - `column`: 0-based column, counted in chars
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
    pub index: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// The start of any source text.
    pub const START: Position = Position {
        index: 0,
        line: 1,
        column: 0,
    };

    #[inline]
    pub const fn new(index: usize, line: u32, column: u32) -> Self {
        Position {
            index,
            line,
            column,
        }
    }

    /// Position reached after reading `text` starting at `self`.
    #[must_use]
    pub fn advance(self, text: &str) -> Position {
        let mut pos = self;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            pos.index += c.len_utf8();
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
                pos.index += 1;
                pos.line += 1;
                pos.column = 0;
            } else if is_line_terminator(c) {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
        }
        pos
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Columns are stored 0-based; humans count from 1.
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// Half-open source range `[start, end)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// An empty span at `pos`.
    #[inline]
    pub const fn point(pos: Position) -> Self {
        Span {
            start: pos,
            end: pos,
        }
    }

    /// Span covering `self` through `other`.
    ///
    /// Takes the start of `self` and the end of `other`; callers pass spans in
    /// source order (first child, last child).
    #[inline]
    #[must_use]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.index.saturating_sub(self.start.index)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range, for slicing the source text.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start.index..self.end.index
    }

    /// Check whether a byte index lies inside this span.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start.index && index < self.end.index
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
