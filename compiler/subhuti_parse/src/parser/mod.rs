//! The parser state machine.
//!
//! One [`Parser`] runs rule bodies over either a pre-lexed token slice or raw
//! source text lexed on demand. All backtracking goes through
//! [`ParserSnapshot`]: a `Copy` value holding the position and the child count
//! of the node under construction. Failure is a flag, never a `Result`, so
//! trying an alternative costs a snapshot and a restore.

mod combinators;
mod execute;
mod snapshot;

use subhuti_ir::{Position, Span, Token};
use subhuti_lexer::{LexCache, LexError, Lexer, LexicalGoal};
use tracing::{debug, trace};

pub use snapshot::ParserSnapshot;

use crate::collect::Collector;
use crate::error::Failure;
use crate::packrat::PackratCache;
use crate::recovery::Recovery;
use crate::trace::{TraceEvent, TraceRecorder};
use crate::{CstNode, ParseError, ParseErrorKind, ParseOptions, ParseStats, Rule};

/// Position state saved and restored on backtracking.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct State {
    /// End of the last consumed token. `pos.index` is the code index.
    pub(crate) pos: Position,
    /// Number of tokens consumed so far.
    pub(crate) token_pos: usize,
    pub(crate) last_token: Option<&'static str>,
    pub(crate) template_depth: u32,
}

impl State {
    #[inline]
    pub(crate) fn code_index(&self) -> usize {
        self.pos.index
    }

    /// Where a rule call starts: the token index, and the code index that
    /// tells apart two lexings of the source reaching the same token count.
    #[inline]
    pub(crate) fn start_key(&self) -> StartKey {
        (self.token_pos, self.pos.index)
    }
}

/// (token index, code index) of a rule call.
pub(crate) type StartKey = (usize, usize);

enum Input<'a> {
    Tokens(&'a [Token]),
    Source { source: &'a str, cache: LexCache },
    /// Grammar collection reads no input.
    Empty,
}

/// Execution strategy for rule bodies.
pub(crate) enum Mode {
    /// Match input.
    Parse,
    /// Record the grammar instead of matching.
    Collect(Collector),
}

/// The next token and the state right after it.
pub(crate) struct Next {
    pub(crate) token: Token,
    pub(crate) end: Position,
    pub(crate) template_depth: u32,
}

/// A rule on the active call chain.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Frame {
    pub(crate) name: &'static str,
    pub(crate) start: StartKey,
    /// Entered while its caller's node had no children yet.
    pub(crate) first_symbol: bool,
}

/// Result of a successful top-level parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOutput {
    pub cst: CstNode,
    /// Errors recovered by `many_with_recovery`; empty without recovery.
    pub errors: Vec<ParseError>,
    /// Rendered trace outline, when tracing was on.
    pub trace: Option<String>,
    pub stats: ParseStats,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Backtracking packrat parser.
pub struct Parser<'a> {
    input: Input<'a>,
    /// Vocabulary for on-demand lexing and error suggestions.
    lexer: Option<&'a Lexer>,
    pub(crate) mode: Mode,
    pub(crate) options: ParseOptions,
    pub(crate) success: bool,
    pub(crate) state: State,
    /// Nodes under construction; the bottom one collects the top-level result.
    pub(crate) stack: Vec<CstNode>,
    pub(crate) call_stack: Vec<Frame>,
    pub(crate) packrat: PackratCache,
    pub(crate) stats: ParseStats,
    pub(crate) failure: Option<Failure>,
    lex_error: Option<LexError>,
    /// A grammar loop aborts the whole parse.
    pub(crate) fatal: Option<ParseError>,
    pub(crate) trace: Option<TraceRecorder>,
    pub(crate) recovery: Option<Recovery>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn with_input(input: Input<'a>, lexer: Option<&'a Lexer>, mode: Mode) -> Self {
        Parser {
            input,
            lexer,
            mode,
            options: ParseOptions::default(),
            success: true,
            state: State::default(),
            stack: vec![CstNode::new("")],
            call_stack: Vec::new(),
            packrat: PackratCache::default(),
            stats: ParseStats::default(),
            failure: None,
            lex_error: None,
            fatal: None,
            trace: None,
            recovery: None,
            errors: Vec::new(),
        }
    }

    /// Parse a pre-lexed token stream.
    pub fn from_tokens(tokens: &'a [Token]) -> Self {
        Self::with_input(Input::Tokens(tokens), None, Mode::Parse)
    }

    /// Parse source text, lexing one token at a time under the goal each
    /// `consume` asks for.
    pub fn from_source(lexer: &'a Lexer, source: &'a str) -> Self {
        Self::with_input(
            Input::Source {
                source,
                cache: LexCache::new(),
            },
            Some(lexer),
            Mode::Parse,
        )
    }

    pub(crate) fn for_collection() -> Self {
        Self::with_input(Input::Empty, None, Mode::Collect(Collector::default()))
    }

    /// Token definitions used for suggestions (keyword texts, reserved words).
    #[must_use]
    pub fn with_lexer(mut self, lexer: &'a Lexer) -> Self {
        self.lexer = Some(lexer);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn lexer_ref(&self) -> Option<&'a Lexer> {
        self.lexer
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    #[inline]
    pub fn is_collecting(&self) -> bool {
        matches!(self.mode, Mode::Collect(_))
    }

    /// Whether the current sequence is still matching.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Fail the current sequence (semantic predicates).
    pub fn fail(&mut self) {
        if !self.is_collecting() {
            self.success = false;
        }
    }

    pub fn stats(&self) -> ParseStats {
        ParseStats {
            cache_entries: self.packrat.len(),
            ..self.stats
        }
    }

    pub fn trace_recorder(&self) -> Option<&TraceRecorder> {
        self.trace.as_ref()
    }

    /// Code index: byte offset right after the last consumed token.
    #[inline]
    pub fn code_index(&self) -> usize {
        self.state.code_index()
    }

    /// Number of tokens consumed so far.
    #[inline]
    pub fn token_index(&self) -> usize {
        self.state.token_pos
    }

    // === Top level ===

    fn reset(&mut self) {
        self.success = true;
        self.state = State::default();
        self.stack = vec![CstNode::new("")];
        self.call_stack.clear();
        self.packrat.clear();
        self.stats = ParseStats::default();
        self.failure = None;
        self.lex_error = None;
        self.fatal = None;
        self.errors.clear();
        if let Input::Source { cache, .. } = &mut self.input {
            cache.clear();
        }
        self.trace = self
            .options
            .trace
            .is_enabled()
            .then(TraceRecorder::new);
        self.recovery = self.options.error_recovery.clone().map(Recovery::new);
    }

    /// Run `rule` as the start rule. The whole input must be consumed.
    #[tracing::instrument(level = "debug", skip_all, fields(rule = rule.name))]
    pub fn parse(&mut self, rule: &Rule) -> Result<ParseOutput, ParseError> {
        self.reset();
        let matched = self.subrule(rule);
        let trace = self.finish_trace();

        let cst = match self.finish(rule, matched) {
            Ok(cst) => cst,
            Err(mut err) => {
                debug!(code = %err.code(), "parse failed");
                err.trace = trace;
                return Err(err);
            }
        };
        let stats = self.stats();
        debug!(
            computations = stats.rule_computations,
            cache_hits = stats.cache_hits,
            tokens = stats.tokens_consumed,
            recovered = self.errors.len(),
            "parse finished"
        );
        Ok(ParseOutput {
            cst,
            errors: std::mem::take(&mut self.errors),
            trace,
            stats,
        })
    }

    /// Check the outcome of the start rule and take its node.
    fn finish(&mut self, rule: &Rule, matched: bool) -> Result<CstNode, ParseError> {
        if let Some(err) = self.fatal.take() {
            return Err(err);
        }
        if !matched {
            return Err(self.failure_error());
        }
        if let Some(next) = self.peek_next(LexicalGoal::Div) {
            // Report the farthest failure when it lies past the stopping point.
            let farther = self
                .failure
                .as_ref()
                .is_some_and(|f| f.token_pos > self.state.token_pos);
            if farther {
                return Err(self.failure_error());
            }
            return Err(ParseError::unconsumed(next.token, vec![rule.name]));
        }
        if let Some(err) = self.pending_lex_error(self.state.pos) {
            return Err(ParseError::lex(err, vec![rule.name]));
        }
        Ok(self
            .stack
            .first_mut()
            .and_then(|root| root.take_children().pop())
            .unwrap_or_else(|| CstNode::new(rule.name)))
    }

    fn finish_trace(&mut self) -> Option<String> {
        let recorder = self.trace.as_ref()?;
        if self.options.trace == crate::TraceMode::Print {
            for line in recorder.lines() {
                debug!(target: "subhuti::trace", "{line}");
            }
        }
        Some(recorder.render())
    }

    /// Error for a failed top-level rule.
    fn failure_error(&mut self) -> ParseError {
        let failure = self.failure.take().unwrap_or_default();
        if failure.found.is_none() {
            let at = failure.span.start;
            if let Some(err) = self.pending_lex_error(at) {
                return ParseError::lex(err, failure.rule_stack);
            }
        }
        failure.into_error(ParseErrorKind::Syntax, self.lexer)
    }

    /// A recorded lex error at or after `at`.
    fn pending_lex_error(&self, at: Position) -> Option<LexError> {
        self.lex_error
            .as_ref()
            .filter(|err| err.position().index >= at.index)
            .cloned()
    }

    // === Tokens ===

    /// Look at the next token under `goal` without consuming it.
    pub(crate) fn peek_next(&mut self, goal: LexicalGoal) -> Option<Next> {
        let state = self.state;
        let lexed = match &mut self.input {
            Input::Tokens(tokens) => {
                return tokens.get(state.token_pos).map(|t| Next {
                    token: t.clone(),
                    end: t.end(),
                    template_depth: state.template_depth,
                });
            }
            Input::Empty => return None,
            Input::Source { source, cache } => {
                let lexer = self.lexer?;
                cache.read_token_at(
                    lexer,
                    source,
                    state.pos,
                    goal,
                    state.last_token,
                    state.template_depth,
                )
            }
        };
        match lexed {
            Ok(Some(lexed)) => Some(Next {
                token: lexed.token,
                end: lexed.next,
                template_depth: lexed.template_depth,
            }),
            Ok(None) => None,
            Err(err) => {
                let farther = self
                    .lex_error
                    .as_ref()
                    .map_or(true, |prev| err.position().index > prev.position().index);
                if farther {
                    self.lex_error = Some(err);
                }
                None
            }
        }
    }

    /// Move past `next`.
    pub(crate) fn advance(&mut self, next: &Next) {
        self.state = State {
            pos: next.end,
            token_pos: self.state.token_pos + 1,
            last_token: Some(next.token.name),
            template_depth: next.template_depth,
        };
    }

    /// Record a failed expectation at the current position.
    pub(crate) fn expected(&mut self, name: &'static str, found: Option<Token>) {
        let call_stack = &self.call_stack;
        Failure::note(
            &mut self.failure,
            self.state.token_pos,
            Span::point(self.state.pos),
            name,
            found,
            || call_stack.iter().map(|f| f.name).collect(),
        );
    }

    /// Consume the next token if it is `name`, lexed under the default goal.
    pub fn consume(&mut self, name: &'static str) -> bool {
        self.consume_with_goal(name, LexicalGoal::Div)
    }

    /// Consume the next token if it is `name`, lexed under `goal`.
    ///
    /// Fails softly: on mismatch the success flag clears and nothing is
    /// attached.
    pub fn consume_with_goal(&mut self, name: &'static str, goal: LexicalGoal) -> bool {
        if !self.success {
            return false;
        }
        if let Mode::Collect(collector) = &mut self.mode {
            collector.consume(name);
            return true;
        }

        match self.peek_next(goal) {
            Some(next) if next.token.name == name => {
                trace!(token = name, value = %next.token.value, index = next.token.index(), "consume");
                self.trace_event(TraceEvent::Consume {
                    name,
                    value: Some(next.token.value.clone()),
                });
                let leaf = CstNode::leaf(&next.token);
                if let Some(recovery) = self.recovery.as_mut() {
                    recovery.records.leaf(leaf.clone(), self.state.token_pos);
                }
                self.attach(leaf);
                self.advance(&next);
                self.stats.tokens_consumed += 1;
                true
            }
            other => {
                self.trace_event(TraceEvent::Consume { name, value: None });
                self.expected(name, other.map(|n| n.token));
                self.success = false;
                false
            }
        }
    }

    // === Look-ahead ===

    /// Name of the next token, without consuming it.
    pub fn peek_name(&mut self) -> Option<&'static str> {
        if self.is_collecting() {
            return None;
        }
        self.peek_next(LexicalGoal::Div).map(|n| n.token.name)
    }

    /// The next token, without consuming it.
    pub fn peek_token(&mut self) -> Option<Token> {
        if self.is_collecting() {
            return None;
        }
        self.peek_next(LexicalGoal::Div).map(|n| n.token)
    }

    /// Positive look-ahead: succeed, without consuming, if the next token is `name`.
    pub fn is_next(&mut self, name: &'static str) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            return true;
        }
        let next = self.peek_next(LexicalGoal::Div);
        if next.as_ref().is_some_and(|n| n.token.name == name) {
            return true;
        }
        self.expected(name, next.map(|n| n.token));
        self.success = false;
        false
    }

    /// Negative look-ahead: fail if the next token is `name`.
    pub fn not_next(&mut self, name: &'static str) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            return true;
        }
        if self.peek_name() == Some(name) {
            self.success = false;
            return false;
        }
        true
    }

    /// `[no LineTerminator here]`: fail if a line break precedes the next token.
    pub fn no_line_break(&mut self) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            return true;
        }
        let broken = self
            .peek_next(LexicalGoal::Div)
            .is_some_and(|n| n.token.has_line_break_before);
        if broken {
            self.success = false;
        }
        !broken
    }

    /// Whether all input has been consumed.
    pub fn at_end(&mut self) -> bool {
        self.peek_next(LexicalGoal::Div).is_none()
    }

    // === CST ===

    /// Attach `node` to the node under construction.
    pub(crate) fn attach(&mut self, node: CstNode) {
        if let Some(top) = self.stack.last_mut() {
            top.push(node);
        }
    }

    pub(crate) fn child_count(&self) -> usize {
        self.stack.last().map_or(0, CstNode::child_count)
    }

    pub(crate) fn trace_event(&mut self, event: TraceEvent) {
        if let Some(trace) = self.trace.as_mut() {
            trace.record(event);
        }
    }

    pub(crate) fn rule_stack(&self) -> Vec<&'static str> {
        self.call_stack.iter().map(|f| f.name).collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
