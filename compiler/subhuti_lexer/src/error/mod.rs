//! Lexer errors.

use subhuti_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use subhuti_ir::{Position, Span};
use thiserror::Error;

/// Fatal tokenization failure.
///
/// End of input is not an error: `read_token_at` reports it as `Ok(None)`.
#[derive(Clone, Debug, Error, PartialEq, Eq, Hash)]
pub enum LexError {
    #[error("unexpected character {ch:?} at {position}")]
    UnexpectedCharacter { ch: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedCharacter { position, .. } => *position,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { ch, position } => {
                Span::new(*position, position.advance(ch.encode_utf8(&mut [0; 4])))
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LexError::UnexpectedCharacter { ch, .. } => {
                let mut diag = Diagnostic::error(ErrorCode::E0001)
                    .with_message(format!("unexpected character {ch:?}"))
                    .with_label(self.span(), "no token matches here");
                if !ch.is_ascii() {
                    diag = diag.with_suggestion(Suggestion::text(
                        format!("`{ch}` (U+{:04X}) is outside the token set", *ch as u32),
                        1,
                    ));
                }
                diag
            }
        }
    }
}

/// Invalid token definitions, reported by `Lexer::new`.
#[derive(Debug, Error)]
pub enum LexerBuildError {
    #[error("token definition with an empty name")]
    EmptyName,
    #[error("keyword token `{name}` has empty text")]
    EmptyKeyword { name: &'static str },
    #[error("token `{name}` has an invalid pattern")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

impl LexerBuildError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(ErrorCode::E0002).with_message(self.to_string());
        match self {
            LexerBuildError::InvalidPattern { source, .. } => diag.with_note(source.to_string()),
            _ => diag,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
