//! Error codes for all framework diagnostics.
//!
//! Format: E#### where the first digit is the phase:
//! - E0xxx: lexer
//! - E1xxx: parser
//! - E2xxx: grammar validation
//! - E9xxx: internal analyzer failures

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer (E0xxx)
    /// No token definition matches at a position
    E0001,
    /// Invalid token definition
    E0002,

    // Parser (E1xxx)
    /// Unexpected token
    E1001,
    /// Input left over after the root rule
    E1002,
    /// Left recursion hit while parsing
    E1003,
    /// Ordered choice re-entered a rule at the same position
    E1004,
    /// Statement skipped by error recovery
    E1005,

    // Grammar validation (E2xxx)
    /// Left-recursive rule
    E2001,
    /// Or-branch shadowed by an earlier prefix
    E2002,
    /// Or-branches with identical expansions
    E2003,
    /// Prefix overlap the deeper pass could not confirm
    E2004,
    /// Rule and token share a name
    E2005,

    // Internal (E9xxx)
    /// Grammar analysis timed out
    E9001,
    /// Expansion produced a path longer than its bound
    E9002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description, used by `--explain`-style tooling.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "no token definition matches the input",
            ErrorCode::E0002 => "invalid token definition",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "unconsumed input after the root rule",
            ErrorCode::E1003 => "left recursion detected while parsing",
            ErrorCode::E1004 => "ordered choice re-entered a rule without consuming input",
            ErrorCode::E1005 => "statement skipped by error recovery",
            ErrorCode::E2001 => "left-recursive rule",
            ErrorCode::E2002 => "or-branch shadowed by an earlier alternative",
            ErrorCode::E2003 => "or-branches with identical expansions",
            ErrorCode::E2004 => "unconfirmed prefix overlap between or-branches",
            ErrorCode::E2005 => "rule and token share a name",
            ErrorCode::E9001 => "grammar analysis timed out",
            ErrorCode::E9002 => "path expansion exceeded its bound",
        }
    }

    pub fn is_lexer_error(&self) -> bool {
        self.as_str().starts_with("E0")
    }

    pub fn is_parser_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_grammar_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
