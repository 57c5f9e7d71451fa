//! Core diagnostic types.

use std::fmt;

use subhuti_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// `Fatal` marks grammar defects that make parsing impossible (left
/// recursion); the rest follow the usual compiler ladder.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    /// `Fatal` and `Error` both block a strict validation.
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete text replacement attached to a suggestion.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Replacement {
    /// The span to replace (empty for an insertion).
    pub span: Span,
    /// The replacement text.
    pub text: String,
}

/// A suggestion for fixing a diagnostic.
///
/// Suggestions carry a `priority` (lower = more likely relevant) so that the
/// renderer can order several heuristics that fire at once.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    pub message: String,
    pub replacement: Option<Replacement>,
    /// 0 = most likely, 3 = long shot.
    pub priority: u8,
}

impl Suggestion {
    /// A text-only suggestion.
    pub fn text(message: impl Into<String>, priority: u8) -> Self {
        Suggestion {
            message: message.into(),
            replacement: None,
            priority,
        }
    }

    /// "did you mean `x`?" at the highest priority.
    pub fn did_you_mean(candidate: impl fmt::Display, span: Span) -> Self {
        let candidate = candidate.to_string();
        Suggestion {
            message: format!("did you mean `{candidate}`?"),
            replacement: Some(Replacement {
                span,
                text: candidate,
            }),
            priority: 0,
        }
    }

    /// Insert `text` at `span`.
    pub fn insert(message: impl Into<String>, span: Span, text: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            replacement: Some(Replacement {
                span: Span::point(span.start),
                text: text.into(),
            }),
            priority: 1,
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rich diagnostic with all context needed for a good error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn fatal(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Fatal)
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// Add several suggestions, keeping them ordered by priority.
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        self.suggestions.extend(suggestions);
        self.suggestions.sort_by_key(|s| s.priority);
        self
    }

    /// The primary label's span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
