//! Shared data types for the Subhuti parsing framework.
//!
//! Everything here is plain data: source positions, spans and the tokens the
//! lexer produces. Higher layers (lexer, parser, grammar analysis, diagnostics)
//! all speak these types.

mod span;
mod token;

pub use span::{is_line_terminator, Position, Span};
pub use token::Token;
