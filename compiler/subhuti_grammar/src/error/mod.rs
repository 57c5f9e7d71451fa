//! Analyzer errors.
//!
//! Findings about the grammar itself are not errors here: they are
//! [`ConflictError`](crate::ConflictError) values collected in a
//! [`ValidationReport`]. The types below cover the analysis failing to run
//! and a strict validation rejecting the grammar.

use std::time::Duration;

use subhuti_diagnostic::{Diagnostic, ErrorCode};
use subhuti_parse::CollectError;

use crate::ValidationReport;

/// The analysis itself could not finish.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("grammar analysis timed out in `{rule}` after {elapsed:?}")]
    Timeout {
        rule: &'static str,
        elapsed: Duration,
    },
    #[error("expansion of `{rule}` produced a path of length {len}, over its bound of {bound}")]
    PathBoundExceeded {
        rule: &'static str,
        len: usize,
        bound: usize,
    },
}

impl AnalysisError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::Timeout { .. } => ErrorCode::E9001,
            AnalysisError::PathBoundExceeded { .. } => ErrorCode::E9002,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            AnalysisError::Timeout { .. } => diag.with_note(
                "raise the analysis timeout or lower K and the BFS level for large grammars",
            ),
            AnalysisError::PathBoundExceeded { .. } => {
                diag.with_note("this is an analyzer bug; please report it with the grammar")
            }
        }
    }
}

/// Why [`GrammarAnalyzer::validate`](crate::GrammarAnalyzer::validate) rejected
/// a grammar.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GrammarValidationError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// Strict mode and at least one blocking finding.
    #[error("grammar validation found {} blocking problems", .report.error_count())]
    Conflicts { report: Box<ValidationReport> },
}

impl GrammarValidationError {
    /// One diagnostic per problem, blocking findings first.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            GrammarValidationError::Collect(err) => vec![Diagnostic::error(ErrorCode::E2005)
                .with_message(err.to_string())
                .with_note("rule names and token names share one namespace")],
            GrammarValidationError::Analysis(err) => vec![err.to_diagnostic()],
            GrammarValidationError::Conflicts { report } => {
                let mut diagnostics = report.diagnostics();
                diagnostics.sort_by_key(|d| d.severity);
                diagnostics
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
