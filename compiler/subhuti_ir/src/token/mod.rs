//! Lexed tokens.

use std::fmt;

use crate::{Position, Span};

/// A token produced by the lexer.
///
/// Token names come from the grammar's token definitions and are compared by
/// value, so a grammar can use plain string literals (`"Identifier"`) on both
/// sides.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    /// Name of the token definition that matched.
    pub name: &'static str,
    /// The matched source text.
    pub value: String,
    /// Where the token sits in the source.
    pub span: Span,
    /// Whether skipped trivia before this token contained a line terminator.
    ///
    /// Drives automatic semicolon insertion and `[no LineTerminator here]`
    /// restrictions in ECMAScript-like grammars.
    pub has_line_break_before: bool,
}

impl Token {
    pub fn new(name: &'static str, value: impl Into<String>, span: Span) -> Self {
        Token {
            name,
            value: value.into(),
            span,
            has_line_break_before: false,
        }
    }

    #[must_use]
    pub fn with_line_break_before(mut self, has_line_break: bool) -> Self {
        self.has_line_break_before = has_line_break;
        self
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Byte index of the first character.
    #[inline]
    pub fn index(&self) -> usize {
        self.span.start.index
    }

    /// Byte index one past the last character.
    #[inline]
    pub fn end_index(&self) -> usize {
        self.span.end.index
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.span.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.span.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}", self.name, self.value, self.span.start)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
