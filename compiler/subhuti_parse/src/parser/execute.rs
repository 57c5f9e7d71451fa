//! Rule execution: loop detection, packrat lookup, CST node lifecycle.

use subhuti_ir::Span;
use subhuti_lexer::LexicalGoal;
use tracing::{trace, warn};

use super::Frame;
use crate::error::LoopKind;
use crate::packrat::PackratEntry;
use crate::trace::TraceEvent;
use crate::{CstNode, ParseError, Parser, Rule};

impl Parser<'_> {
    /// Run `rule` at the current position and attach its node on success.
    pub fn subrule(&mut self, rule: &Rule) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            self.collect_subrule(rule);
            return true;
        }
        if self.fatal.is_some() {
            self.success = false;
            return false;
        }
        subhuti_stack::with_stack(|| self.execute(rule))
    }

    fn execute(&mut self, rule: &Rule) -> bool {
        let start = self.state;
        let key = start.start_key();
        let index = start.token_pos;

        if let Some(at) = self
            .call_stack
            .iter()
            .position(|f| f.name == rule.name && f.start == key)
        {
            self.grammar_loop(rule, at);
            return false;
        }

        if let Some(entry) = self.packrat.get(&(rule.name, key)).cloned() {
            return self.replay(rule, index, entry);
        }

        self.stats.rule_computations += 1;
        let first_symbol = self.child_count() == 0;
        self.call_stack.push(Frame {
            name: rule.name,
            start: key,
            first_symbol,
        });
        self.stack.push(CstNode::new(rule.name));
        let record = self
            .recovery
            .as_mut()
            .map(|r| r.records.open(rule.name, start.token_pos));
        self.trace_event(TraceEvent::RuleEnter {
            name: rule.name,
            index,
        });
        trace!(rule = rule.name, index, "enter");

        (rule.body)(self);

        let mut node = self
            .stack
            .pop()
            .unwrap_or_else(|| CstNode::new(rule.name));
        self.call_stack.pop();
        let success = self.success && self.fatal.is_none();
        if let (Some(recovery), Some(record)) = (self.recovery.as_mut(), record) {
            recovery.records.close(record, self.state.token_pos, success);
        }
        self.trace_event(TraceEvent::RuleExit {
            name: rule.name,
            success,
        });
        trace!(rule = rule.name, success, "exit");

        if self.fatal.is_some() {
            self.success = false;
            return false;
        }

        if success {
            node.finish();
            self.packrat.insert(
                (rule.name, key),
                PackratEntry {
                    end: self.state,
                    cst: Some(node.clone()),
                    success: true,
                    consumed: self.state.token_pos - start.token_pos,
                },
            );
            self.attach(node);
        } else {
            self.packrat.insert(
                (rule.name, key),
                PackratEntry {
                    end: start,
                    cst: None,
                    success: false,
                    consumed: 0,
                },
            );
            self.state = start;
        }
        success
    }

    /// Answer a rule call from the packrat cache.
    fn replay(&mut self, rule: &Rule, index: usize, entry: PackratEntry) -> bool {
        self.stats.cache_hits += 1;
        self.trace_event(TraceEvent::CacheHit {
            name: rule.name,
            index,
            success: entry.success,
        });
        trace!(rule = rule.name, index, success = entry.success, "cache hit");

        if !entry.success {
            self.success = false;
            return false;
        }
        if let Some(cst) = entry.cst {
            let start = self.state.token_pos;
            if let Some(recovery) = self.recovery.as_mut() {
                recovery
                    .records
                    .replay(cst.clone(), start, start + entry.consumed);
            }
            self.attach(cst);
        }
        self.state = entry.end;
        true
    }

    /// `rule` was re-entered at the same position; `at` is the earlier frame.
    fn grammar_loop(&mut self, rule: &Rule, at: usize) {
        let left_edge = self.child_count() == 0
            && self.call_stack[at + 1..].iter().all(|f| f.first_symbol);
        let kind = if left_edge {
            LoopKind::LeftRecursion
        } else {
            LoopKind::OrBranchShadowing
        };
        let mut chain: Vec<_> = self.call_stack[at..].iter().map(|f| f.name).collect();
        chain.push(rule.name);

        let found = self.peek_next(LexicalGoal::Div).map(|n| n.token);
        let span = found
            .as_ref()
            .map_or_else(|| Span::point(self.state.pos), |t| t.span);
        warn!(rule = rule.name, kind = kind.as_str(), "grammar loop");
        self.fatal = Some(ParseError::grammar_loop(kind, chain, span, found));
        self.success = false;
    }
}
