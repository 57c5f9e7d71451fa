//! Diagnostic system shared by the lexer, the parser and the grammar analyzer.
//!
//! Every error the framework reports can be turned into a [`Diagnostic`]:
//! - an error code for searchability
//! - a message (what went wrong)
//! - labeled spans (where it went wrong)
//! - notes (why)
//! - suggestions (how to fix)
//!
//! The [`emitter`] module renders diagnostics for humans.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Replacement, Severity, Suggestion};
pub use error_code::ErrorCode;
