//! Diagnostic emitters.
//!
//! Only the terminal emitter exists: diagnostics are rendered for humans, with
//! an optional source snippet under each primary label.

mod terminal;

pub use terminal::{render, ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Emit a one-line summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
