//! Statement-level error recovery.
//!
//! With recovery enabled, [`Parser::many_with_recovery`] does not stop at the
//! first iteration that fails. It:
//! 1. restores the state from before the iteration,
//! 2. scans forward to a synchronization point (see [`RecoveryConfig`]),
//! 3. rebuilds the best partial CST the failed attempt produced, using the
//!    parse-record tree,
//! 4. attaches an `Error` node holding that partial CST and the leftover
//!    tokens, records a diagnostic and carries on after the sync point.

mod records;

use subhuti_ir::Token;
use subhuti_lexer::LexicalGoal;
use tracing::debug;

pub(crate) use records::RecordTree;

use crate::error::Failure;
use crate::{CstNode, ParseErrorKind, Parser};

/// Synchronization tokens for [`Parser::many_with_recovery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// Tokens that start a new item: skipping stops before them.
    pub sync_before: Vec<&'static str>,
    /// Tokens that end an item: skipping stops after them.
    pub sync_after: Vec<&'static str>,
    /// Tokens at which a failed iteration ends the loop instead of being
    /// skipped, such as the `}` closing a block.
    pub stop_at: Vec<&'static str>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        RecoveryConfig {
            sync_before: Vec::new(),
            sync_after: vec!["Semicolon"],
            stop_at: Vec::new(),
        }
    }
}

impl RecoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sync_before(mut self, names: &[&'static str]) -> Self {
        self.sync_before.extend_from_slice(names);
        self
    }

    /// Replace the stop-after set.
    #[must_use]
    pub fn sync_after(mut self, names: &[&'static str]) -> Self {
        self.sync_after = names.to_vec();
        self
    }

    #[must_use]
    pub fn stop_at(mut self, names: &[&'static str]) -> Self {
        self.stop_at.extend_from_slice(names);
        self
    }
}

/// Recovery state of one parse.
#[derive(Debug)]
pub(crate) struct Recovery {
    pub(crate) config: RecoveryConfig,
    pub(crate) records: RecordTree,
}

impl Recovery {
    pub(crate) fn new(config: RecoveryConfig) -> Self {
        Recovery {
            config,
            records: RecordTree::default(),
        }
    }
}

impl Parser<'_> {
    /// `many` that skips and reports failing iterations when error recovery
    /// is enabled. Without recovery it is exactly [`Parser::many`].
    pub fn many_with_recovery(&mut self, mut f: impl FnMut(&mut Self)) -> bool {
        if self.recovery.is_none() || self.is_collecting() {
            return self.many(f);
        }
        if !self.success {
            return false;
        }

        loop {
            if self.at_end() {
                break;
            }
            let before = self.snapshot();
            let outer_failure = self.failure.take();
            let (mark, scope) = self
                .recovery
                .as_ref()
                .map_or((0, None), |r| (r.records.len(), r.records.current()));

            f(self);

            let failure = self.failure.take();
            self.merge_failure(outer_failure, failure.clone());
            if self.fatal.is_some() {
                self.success = false;
                return false;
            }
            if self.success {
                if !self.progressed_since(before) {
                    break;
                }
                continue;
            }

            self.restore(before);
            self.success = true;
            if !self.skip_failed_item(before.token_index(), mark, scope, failure) {
                break;
            }
        }
        true
    }

    /// Keep the farther of two failures as the parse-wide one.
    fn merge_failure(&mut self, outer: Option<Failure>, inner: Option<Failure>) {
        self.failure = match (outer, inner) {
            (Some(o), Some(i)) => Some(if i.token_pos >= o.token_pos { i } else { o }),
            (o, i) => o.or(i),
        };
    }

    /// Skip to the next sync point and attach an error node for the skipped
    /// item. Returns `false` when the loop should end instead.
    fn skip_failed_item(
        &mut self,
        start: usize,
        mark: usize,
        scope: Option<usize>,
        failure: Option<Failure>,
    ) -> bool {
        let Some(config) = self.recovery.as_ref().map(|r| r.config.clone()) else {
            return false;
        };
        if self
            .peek_name()
            .is_some_and(|name| config.stop_at.contains(&name))
        {
            return false;
        }

        let skipped = self.scan_to_sync(&config);
        if skipped.is_empty() {
            return false;
        }
        let bound = start + skipped.len();
        let (partial, covered) = self
            .recovery
            .as_ref()
            .map_or((Vec::new(), start), |r| {
                r.records.rebuild(mark, scope, start, bound)
            });
        let leftover = &skipped[covered - start..];
        let node = CstNode::error(partial, leftover);
        debug!(
            skipped = skipped.len(),
            partial_tokens = covered - start,
            "recovered"
        );

        let failure = failure.unwrap_or_else(|| Failure {
            token_pos: start,
            span: skipped[0].span,
            expected: Vec::new(),
            found: Some(skipped[0].clone()),
            rule_stack: self.rule_stack(),
        });
        let mut error = failure.into_error(
            ParseErrorKind::Recovered {
                skipped: skipped.len(),
            },
            self.lexer_ref(),
        );
        if let Some(loc) = node.loc {
            error.span = loc;
        }
        self.errors.push(error);
        self.attach(node);
        true
    }

    /// Consume tokens up to the next sync point and return them. At least one
    /// token is skipped unless input is exhausted.
    fn scan_to_sync(&mut self, config: &RecoveryConfig) -> Vec<Token> {
        let mut skipped = Vec::new();
        while let Some(next) = self.peek_next(LexicalGoal::Div) {
            if !skipped.is_empty() && config.sync_before.contains(&next.token.name) {
                break;
            }
            let stop_after = config.sync_after.contains(&next.token.name);
            self.advance(&next);
            skipped.push(next.token);
            if stop_after {
                break;
            }
        }
        skipped
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
