//! Validation report.

use std::fmt;
use std::time::Duration;

use subhuti_diagnostic::{Diagnostic, Severity};

use super::ConflictError;
use crate::CacheSizes;

/// Counters and timings of one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub rules: usize,
    /// `or` nodes with at least two alternatives, in rules that were checked.
    pub or_nodes: usize,
    pub dfs_time: Duration,
    pub conflict_time: Duration,
    /// BFS expansion time, part of `conflict_time`.
    pub bfs_time: Duration,
    pub total_time: Duration,
    pub caches: CacheSizes,
    pub dfs_cache_hits: usize,
}

/// Everything a validation found, plus statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<ConflictError>,
    pub stats: AnalysisStats,
}

impl ValidationReport {
    /// Whether any finding is fatal or an error.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.severity.is_error()).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConflictError> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.findings.iter().map(ConflictError::to_diagnostic).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for finding in &self.findings {
            writeln!(
                f,
                "{}[{}] {}: {}",
                finding.severity,
                finding.kind.as_str(),
                finding.rule,
                finding.message
            )?;
            if let Some(suggestion) = &finding.suggestion {
                writeln!(f, "  help: {suggestion}")?;
            }
        }
        let stats = &self.stats;
        write!(
            f,
            "{} rules, {} or-nodes: {} errors, {} warnings ({:?} total)",
            stats.rules,
            stats.or_nodes,
            self.error_count(),
            self.warnings().count(),
            stats.total_time,
        )
    }
}
