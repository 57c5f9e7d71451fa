//! Parse errors.
//!
//! Ordinary backtracking never builds one of these: rules fail softly through
//! the parser's success flag. A [`ParseError`] is assembled once, when the
//! top-level rule fails, leaves input behind, or hits a grammar loop, from the
//! farthest failure the parser saw.

mod suggest;

use std::fmt;

use subhuti_diagnostic::{emitter, Diagnostic, ErrorCode, Severity, Suggestion};
use subhuti_ir::{Span, Token};
use subhuti_lexer::{LexError, Lexer};

pub(crate) use suggest::suggestions;

/// Why a grammar looped at one position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// The rule reached itself through first symbols only.
    LeftRecursion,
    /// The rule reached itself after an earlier sibling matched nothing,
    /// typically an `or` branch that accepts empty input.
    OrBranchShadowing,
}

impl LoopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopKind::LeftRecursion => "left-recursion",
            LoopKind::OrBranchShadowing => "or-branch-shadowing",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The top-level rule failed.
    Syntax,
    /// The top-level rule matched but tokens remain.
    UnconsumedInput,
    /// Same rule re-entered at the same position on the active call chain.
    Loop {
        kind: LoopKind,
        rule: &'static str,
        /// Rules from the first occurrence to the re-entry, both included.
        chain: Vec<&'static str>,
    },
    /// The lexer could not produce the next token.
    Lex(LexError),
    /// A `many_with_recovery` iteration failed and its input was skipped.
    Recovered {
        /// Number of skipped tokens.
        skipped: usize,
    },
}

/// A structured parse failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The offending token, or an empty span at the failure point.
    pub span: Span,
    /// Token names that would have been accepted at the failure point.
    pub expected: Vec<&'static str>,
    /// The token found there, `None` at end of input.
    pub found: Option<Token>,
    /// Active rules when the failure happened, outermost first.
    pub rule_stack: Vec<&'static str>,
    pub suggestions: Vec<Suggestion>,
    /// Rendered trace of the failed parse, when tracing was on.
    pub trace: Option<String>,
}

/// Farthest failure seen during a parse.
#[derive(Clone, Debug, Default)]
pub(crate) struct Failure {
    /// Tokens consumed when it happened.
    pub(crate) token_pos: usize,
    /// End of the last consumed token.
    pub(crate) span: Span,
    pub(crate) expected: Vec<&'static str>,
    pub(crate) found: Option<Token>,
    pub(crate) rule_stack: Vec<&'static str>,
}

impl Failure {
    /// Merge one failed expectation, keeping only the farthest ones.
    pub(crate) fn note(
        slot: &mut Option<Failure>,
        token_pos: usize,
        at: Span,
        expected: &'static str,
        found: Option<Token>,
        rule_stack: impl FnOnce() -> Vec<&'static str>,
    ) {
        match slot {
            Some(f) if f.token_pos > token_pos => {}
            Some(f) if f.token_pos == token_pos => {
                if !f.expected.contains(&expected) {
                    f.expected.push(expected);
                }
            }
            _ => {
                *slot = Some(Failure {
                    token_pos,
                    span: at,
                    expected: vec![expected],
                    found,
                    rule_stack: rule_stack(),
                });
            }
        }
    }

    pub(crate) fn into_error(self, kind: ParseErrorKind, lexer: Option<&Lexer>) -> ParseError {
        let span = self.found.as_ref().map_or(self.span, |t| t.span);
        let suggestions = suggestions(&self, lexer);
        ParseError {
            kind,
            span,
            expected: self.expected,
            found: self.found,
            rule_stack: self.rule_stack,
            suggestions,
            trace: None,
        }
    }
}

impl ParseError {
    pub(crate) fn unconsumed(found: Token, rule_stack: Vec<&'static str>) -> Self {
        ParseError {
            kind: ParseErrorKind::UnconsumedInput,
            span: found.span,
            expected: Vec::new(),
            found: Some(found),
            rule_stack,
            suggestions: Vec::new(),
            trace: None,
        }
    }

    pub(crate) fn lex(err: LexError, rule_stack: Vec<&'static str>) -> Self {
        ParseError {
            span: err.span(),
            kind: ParseErrorKind::Lex(err),
            expected: Vec::new(),
            found: None,
            rule_stack,
            suggestions: Vec::new(),
            trace: None,
        }
    }

    pub(crate) fn grammar_loop(
        kind: LoopKind,
        chain: Vec<&'static str>,
        span: Span,
        found: Option<Token>,
    ) -> Self {
        let rule = chain.last().copied().unwrap_or_default();
        let suggestions = match kind {
            LoopKind::LeftRecursion => vec![Suggestion::text(
                format!(
                    "rewrite `{rule}` so that it starts with a non-recursive part followed by a repetition: `{rule} -> base (tail)*`"
                ),
                0,
            )],
            LoopKind::OrBranchShadowing => vec![Suggestion::text(
                "an earlier alternative matched without consuming input; reorder the alternatives or make it consume a token",
                1,
            )],
        };
        ParseError {
            kind: ParseErrorKind::Loop {
                kind,
                rule,
                chain: chain.clone(),
            },
            span,
            expected: Vec::new(),
            found,
            rule_stack: chain,
            suggestions,
            trace: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            ParseErrorKind::Syntax => ErrorCode::E1001,
            ParseErrorKind::UnconsumedInput => ErrorCode::E1002,
            ParseErrorKind::Loop {
                kind: LoopKind::LeftRecursion,
                ..
            } => ErrorCode::E1003,
            ParseErrorKind::Loop {
                kind: LoopKind::OrBranchShadowing,
                ..
            } => ErrorCode::E1004,
            ParseErrorKind::Lex(err) => err.to_diagnostic().code,
            ParseErrorKind::Recovered { .. } => ErrorCode::E1005,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Loop { .. })
    }

    fn found_text(&self) -> String {
        match &self.found {
            Some(token) => format!("{} `{}`", token.name, token.value),
            None => "end of input".to_owned(),
        }
    }

    fn expected_text(&self) -> String {
        match self.expected.as_slice() {
            [] => "more input".to_owned(),
            [one] => one.to_string(),
            [a, b] => format!("{a} or {b}"),
            [init @ .., last] => format!("one of {}, or {last}", init.join(", ")),
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::Syntax => format!(
                "expected {}, found {}",
                self.expected_text(),
                self.found_text()
            ),
            ParseErrorKind::UnconsumedInput => {
                format!("unconsumed input starting at {}", self.found_text())
            }
            ParseErrorKind::Loop { kind, rule, chain } => format!(
                "{}: rule `{rule}` re-entered without consuming input ({})",
                kind.as_str(),
                chain.join(" > ")
            ),
            ParseErrorKind::Lex(err) => err.to_string(),
            ParseErrorKind::Recovered { skipped } => format!(
                "skipped {skipped} token{} after an invalid construct: expected {}, found {}",
                if *skipped == 1 { "" } else { "s" },
                self.expected_text(),
                self.found_text()
            ),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        if let ParseErrorKind::Lex(err) = &self.kind {
            return err.to_diagnostic();
        }
        let severity = if self.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        };
        let label = match &self.kind {
            ParseErrorKind::UnconsumedInput => "not part of any rule".to_owned(),
            ParseErrorKind::Loop { .. } => "loop detected here".to_owned(),
            _ => format!("expected {}", self.expected_text()),
        };
        let mut diag = Diagnostic::error(self.code())
            .with_severity(severity)
            .with_message(self.message())
            .with_label(self.span, label)
            .with_suggestions(self.suggestions.iter().cloned());
        if !self.rule_stack.is_empty() {
            diag = diag.with_note(format!("while parsing {}", self.rule_stack.join(" > ")));
        }
        diag
    }

    /// Full report with a snippet of `source` under the failure point.
    pub fn render(&self, source: &str) -> String {
        emitter::render(&self.to_diagnostic(), Some(source))
    }
}

/// `message at line:column`, then the rule path and one `help:` line per
/// suggestion.
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message(), self.span.start)?;
        if !self.rule_stack.is_empty() {
            write!(f, "\n  while parsing {}", self.rule_stack.join(" > "))?;
        }
        for suggestion in &self.suggestions {
            write!(f, "\n  help: {suggestion}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Lex(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
