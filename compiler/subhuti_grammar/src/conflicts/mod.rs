//! Ordered-choice conflict detection.
//!
//! PEG alternatives are tried in order and the first one that matches wins.
//! An alternative is dead for some input when an earlier alternative matches
//! a prefix of it. For every `or` node the First-K paths of the alternatives
//! are compared through a [`PathTrie`]:
//!
//! - an earlier complete path equal to a later complete path: the branches are
//!   identical for that input (ERROR);
//! - an earlier complete path that is a proper prefix of a later path: a
//!   shadowing candidate, confirmed when a BFS level of the later alternative
//!   shows a longer path starting with it (ERROR), otherwise left for review
//!   (WARNING);
//! - a later complete path that is a proper prefix of an earlier one: the
//!   usual longest-first order, reported as a WARNING;
//! - an earlier path cut at K that a later path starts with: the BFS levels of
//!   both alternatives are compared past K and the pair is classified as
//!   identical or shadowing as above, or dropped when the paths diverge.
//!
//! Left-recursive rules are reported as FATAL and not checked further.

mod report;
mod rewrite;

use std::fmt;
use std::time::Instant;

use rustc_hash::FxHashSet;
use subhuti_diagnostic::{Diagnostic, ErrorCode, Severity, Suggestion};
use subhuti_parse::GrammarNode;
use tracing::{debug, trace, warn};

use crate::path::{Path, PathSet, PathTrie};
use crate::{AnalysisError, GrammarAnalyzer, GrammarValidationError};

pub use report::{AnalysisStats, ValidationReport};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    LeftRecursion,
    PrefixConflict,
    IdenticalBranches,
    UnconfirmedPrefixConflict,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::LeftRecursion => "left-recursion",
            ConflictKind::PrefixConflict => "prefix-conflict",
            ConflictKind::IdenticalBranches => "or-identical-branches",
            ConflictKind::UnconfirmedPrefixConflict => "unconfirmed-prefix-conflict",
        }
    }

    pub fn code(self) -> ErrorCode {
        match self {
            ConflictKind::LeftRecursion => ErrorCode::E2001,
            ConflictKind::PrefixConflict => ErrorCode::E2002,
            ConflictKind::IdenticalBranches => ErrorCode::E2003,
            ConflictKind::UnconfirmedPrefixConflict => ErrorCode::E2004,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grammar problem.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConflictError {
    pub severity: Severity,
    pub kind: ConflictKind,
    pub rule: &'static str,
    /// Zero-based alternative indices; the first one wins at parse time.
    /// `None` for left recursion.
    pub branches: Option<(usize, usize)>,
    /// The conflicting paths, in the order of `branches`.
    pub paths: Vec<Path>,
    /// Rules of a left-recursive cycle, first rule repeated at the end.
    pub chain: Vec<&'static str>,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ConflictError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.code())
            .with_severity(self.severity)
            .with_message(self.message.clone())
            .with_note(format!("in rule `{}`", self.rule));
        if let [first, second] = self.paths.as_slice() {
            diag = diag.with_note(format!("conflicting paths: `{first}` and `{second}`"));
        }
        if let Some(suggestion) = &self.suggestion {
            diag = diag.with_suggestion(Suggestion::text(suggestion.clone(), 0));
        }
        diag
    }
}

impl GrammarAnalyzer {
    /// Full analysis: First-K of every rule, left recursion, then conflict
    /// detection on every `or` node of the remaining rules.
    #[tracing::instrument(level = "debug", skip_all, fields(start = self.grammar().start()))]
    pub fn analyze(&mut self) -> Result<ValidationReport, AnalysisError> {
        self.timed(Self::run_analysis)
    }

    /// [`analyze`](Self::analyze), failing in strict mode when a finding is
    /// fatal or an error.
    pub fn validate(&mut self) -> Result<ValidationReport, GrammarValidationError> {
        let report = self.analyze()?;
        if self.config().strict && report.has_errors() {
            return Err(GrammarValidationError::Conflicts {
                report: Box::new(report),
            });
        }
        Ok(report)
    }

    fn run_analysis(&mut self) -> Result<ValidationReport, AnalysisError> {
        let started = Instant::now();
        let bfs_before = self.bfs_time();
        let grammar = self.shared_grammar();
        let mut stats = AnalysisStats {
            rules: grammar.len(),
            ..AnalysisStats::default()
        };

        let dfs_started = Instant::now();
        let cycles = self.left_recursions()?;
        stats.dfs_time = dfs_started.elapsed();
        debug!(rules = stats.rules, cycles = cycles.len(), "first-k done");

        let mut findings = Vec::new();
        let mut recursive = FxHashSet::default();
        for cycle in &cycles {
            recursive.extend(cycle.chain.iter().copied());
            let suggestion = grammar
                .rule(cycle.rule)
                .and_then(|body| rewrite::left_recursion_rewrite(cycle.rule, body))
                .unwrap_or_else(|| rewrite::cycle_advice(cycle));
            let message = if cycle.is_direct() {
                format!("rule `{}` is left-recursive", cycle.rule)
            } else {
                format!(
                    "rule `{}` is left-recursive through {}",
                    cycle.rule,
                    cycle.chain.join(" -> ")
                )
            };
            findings.push(ConflictError {
                severity: Severity::Fatal,
                kind: ConflictKind::LeftRecursion,
                rule: cycle.rule,
                branches: None,
                paths: Vec::new(),
                chain: cycle.chain.clone(),
                message,
                suggestion: Some(suggestion),
            });
        }

        let conflict_started = Instant::now();
        for (rule, body) in grammar.rules() {
            if recursive.contains(rule) {
                continue;
            }
            let mut choices = Vec::new();
            body.walk(&mut |node| {
                if let GrammarNode::Or(alternatives) = node {
                    if alternatives.len() >= 2 {
                        choices.push(alternatives.as_slice());
                    }
                }
            });
            stats.or_nodes += choices.len();
            for alternatives in choices {
                self.check_choice(rule, alternatives, &mut findings)?;
            }
        }
        stats.conflict_time = conflict_started.elapsed();
        stats.bfs_time = self.bfs_time().saturating_sub(bfs_before);
        stats.caches = self.cache_sizes();
        stats.dfs_cache_hits = self.dfs_cache_hits();
        stats.total_time = started.elapsed();

        let report = ValidationReport { findings, stats };
        debug!(
            findings = report.findings.len(),
            errors = report.error_count(),
            "grammar analyzed"
        );
        Ok(report)
    }

    fn check_choice(
        &mut self,
        rule: &'static str,
        alternatives: &[GrammarNode],
        findings: &mut Vec<ConflictError>,
    ) -> Result<(), AnalysisError> {
        let k = self.config().k;
        let mut per_alternative: Vec<PathSet> = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            per_alternative.push(self.expand(alternative, k)?);
        }

        let mut trie: PathTrie<(usize, &Path)> = PathTrie::new();
        let mut reported: FxHashSet<(ConflictKind, usize, usize)> = FxHashSet::default();
        let mut examined: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut deepened: FxHashSet<(usize, usize)> = FxHashSet::default();

        for (j, paths) in per_alternative.iter().enumerate() {
            for later in paths {
                let earlier_prefixes: Vec<(usize, &Path)> = trie
                    .prefix_entries(later.symbols())
                    .into_iter()
                    .copied()
                    .collect();
                for (i, earlier) in earlier_prefixes {
                    let same_length = earlier.len() == later.len();
                    if earlier.is_complete() {
                        if same_length && later.is_complete() {
                            if reported.insert((ConflictKind::IdenticalBranches, i, j)) {
                                findings.push(identical(rule, i, j, earlier));
                            }
                        } else if examined.insert((i, j)) {
                            let finding =
                                self.shadowing(rule, alternatives, i, j, earlier, later)?;
                            reported.insert((finding.kind, i, j));
                            findings.push(finding);
                        }
                    } else if same_length && later.is_complete() {
                        if reported.insert((ConflictKind::PrefixConflict, j, i)) {
                            findings.push(longest_first(rule, i, j, earlier, later));
                        }
                    } else if deepened.insert((i, j)) {
                        if let Some(finding) = self.beyond_k(rule, alternatives, i, j, earlier)? {
                            if reported.insert((finding.kind, i, j)) {
                                findings.push(finding);
                            }
                        }
                    }
                }

                if later.is_complete() && !later.is_empty() {
                    for &(i, earlier) in trie.entries_below(later.symbols()) {
                        if reported.insert((ConflictKind::PrefixConflict, j, i)) {
                            findings.push(longest_first(rule, i, j, earlier, later));
                        }
                    }
                }
            }
            for path in paths {
                trie.insert(path.symbols(), (j, path));
            }
        }
        Ok(())
    }

    /// An earlier complete path is a proper prefix of a later one, or equal
    /// to a later incomplete one.
    fn shadowing(
        &mut self,
        rule: &'static str,
        alternatives: &[GrammarNode],
        i: usize,
        j: usize,
        earlier: &Path,
        later: &Path,
    ) -> Result<ConflictError, AnalysisError> {
        if let Some((level, witness)) = self.find_extension(&alternatives[j], earlier.symbols())? {
            return Ok(prefix_conflict(rule, i, j, earlier, &witness, level));
        }
        let max_level = self.config().max_level;
        warn!(rule, i, j, %earlier, "prefix overlap not confirmed");
        Ok(unconfirmed(rule, i, j, earlier, later, max_level))
    }

    /// An earlier path cut at K is a prefix of a later path. The BFS levels of
    /// both alternatives decide whether they coincide past K, whether the
    /// earlier one stops short of the later one, or whether they part ways.
    fn beyond_k(
        &mut self,
        rule: &'static str,
        alternatives: &[GrammarNode],
        i: usize,
        j: usize,
        shared: &Path,
    ) -> Result<Option<ConflictError>, AnalysisError> {
        let earlier_paths = self.node_levels(&alternatives[i])?;
        let later_paths = self.node_levels(&alternatives[j])?;
        let candidates: Vec<&Path> = earlier_paths
            .iter()
            .filter(|p| p.starts_with(shared.symbols()))
            .collect();

        if let Some(earlier) = candidates
            .iter()
            .find(|p| p.is_complete() && later_paths.contains(**p))
        {
            return Ok(Some(identical(rule, i, j, earlier)));
        }
        for earlier in candidates.iter().filter(|p| p.is_complete()) {
            if let Some((level, witness)) =
                self.find_extension(&alternatives[j], earlier.symbols())?
            {
                return Ok(Some(prefix_conflict(rule, i, j, earlier, &witness, level)));
            }
        }
        if let Some(open) = candidates.iter().find(|p| !p.is_complete()) {
            let max_level = self.config().max_level;
            warn!(rule, i, j, %shared, "overlap past k not resolved");
            return Ok(Some(unconfirmed(rule, i, j, shared, open, max_level)));
        }
        trace!(rule, i, j, %shared, "alternatives part ways past k");
        Ok(None)
    }
}

fn prefix_conflict(
    rule: &'static str,
    i: usize,
    j: usize,
    earlier: &Path,
    witness: &Path,
    level: usize,
) -> ConflictError {
    ConflictError {
        severity: Severity::Error,
        kind: ConflictKind::PrefixConflict,
        rule,
        branches: Some((i, j)),
        paths: vec![earlier.clone(), witness.clone()],
        chain: Vec::new(),
        message: format!(
            "alternative #{} of `{rule}` matches `{earlier}` and shadows alternative #{}, which continues with `{witness}` (level {level})",
            i + 1,
            j + 1,
        ),
        suggestion: Some(format!(
            "move alternative #{} before alternative #{}",
            j + 1,
            i + 1
        )),
    }
}

fn unconfirmed(
    rule: &'static str,
    i: usize,
    j: usize,
    earlier: &Path,
    later: &Path,
    max_level: usize,
) -> ConflictError {
    ConflictError {
        severity: Severity::Warning,
        kind: ConflictKind::UnconfirmedPrefixConflict,
        rule,
        branches: Some((i, j)),
        paths: vec![earlier.clone(), later.clone()],
        chain: Vec::new(),
        message: format!(
            "alternative #{} of `{rule}` matches `{earlier}`, a prefix of `{later}` from alternative #{}; no expansion up to level {max_level} confirmed the overlap",
            i + 1,
            j + 1,
        ),
        suggestion: Some(format!(
            "review the order of alternatives #{} and #{}",
            i + 1,
            j + 1
        )),
    }
}

fn identical(rule: &'static str, i: usize, j: usize, path: &Path) -> ConflictError {
    ConflictError {
        severity: Severity::Error,
        kind: ConflictKind::IdenticalBranches,
        rule,
        branches: Some((i, j)),
        paths: vec![path.clone(), path.clone()],
        chain: Vec::new(),
        message: format!(
            "alternatives #{} and #{} of `{rule}` both match exactly `{path}`",
            i + 1,
            j + 1
        ),
        suggestion: Some(format!(
            "remove alternative #{} or make it differ from alternative #{}",
            j + 1,
            i + 1
        )),
    }
}

/// A later alternative's complete path is a proper prefix of an earlier
/// alternative's path.
fn longest_first(
    rule: &'static str,
    i: usize,
    j: usize,
    earlier: &Path,
    later: &Path,
) -> ConflictError {
    ConflictError {
        severity: Severity::Warning,
        kind: ConflictKind::PrefixConflict,
        rule,
        branches: Some((j, i)),
        paths: vec![later.clone(), earlier.clone()],
        chain: Vec::new(),
        message: format!(
            "alternative #{} of `{rule}` matches `{later}`, a prefix of `{earlier}` from alternative #{}",
            j + 1,
            i + 1
        ),
        suggestion: Some(format!(
            "alternative #{} is tried first; check that it fails without side effects when only `{}` is present",
            i + 1,
            later.symbols().join(" ")
        )),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
