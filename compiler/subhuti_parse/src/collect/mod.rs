//! Grammar AST collection.
//!
//! Rule bodies are plain functions over [`Parser`], so the grammar is whatever
//! those functions call. In collect mode the same bodies run without input:
//! every combinator appends a [`GrammarNode`] to the sequence under
//! construction instead of matching, `consume` always succeeds, and look-ahead
//! helpers do nothing. A rule reached again while it is still being collected
//! yields a bare `Subrule` reference, so recursive grammars terminate.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::parser::Mode;
use crate::{Alt, Parser, Rule};

/// Abstract shape of a rule body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GrammarNode {
    Consume(&'static str),
    Subrule(&'static str),
    Sequence(Vec<GrammarNode>),
    Or(Vec<GrammarNode>),
    Option(Box<GrammarNode>),
    Many(Box<GrammarNode>),
    AtLeastOne(Box<GrammarNode>),
}

impl GrammarNode {
    /// Sequence of `nodes`, or the node itself when there is exactly one.
    pub fn sequence(mut nodes: Vec<GrammarNode>) -> GrammarNode {
        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return node;
            }
        }
        GrammarNode::Sequence(nodes)
    }

    /// The empty sequence.
    pub fn empty() -> GrammarNode {
        GrammarNode::Sequence(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GrammarNode::Sequence(nodes) if nodes.is_empty())
    }

    /// Visit this node and every node below it, parents first.
    pub fn walk<'s>(&'s self, f: &mut dyn FnMut(&'s GrammarNode)) {
        f(self);
        match self {
            GrammarNode::Consume(_) | GrammarNode::Subrule(_) => {}
            GrammarNode::Sequence(nodes) | GrammarNode::Or(nodes) => {
                for node in nodes {
                    node.walk(f);
                }
            }
            GrammarNode::Option(node) | GrammarNode::Many(node) | GrammarNode::AtLeastOne(node) => {
                node.walk(f);
            }
        }
    }

    fn needs_parens(&self) -> bool {
        match self {
            GrammarNode::Sequence(nodes) => nodes.len() > 1,
            GrammarNode::Or(_) => true,
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_parens() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

/// EBNF-like rendering: `a b`, `a | b`, `x?`, `x*`, `x+`, `ε` for nothing.
impl fmt::Display for GrammarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarNode::Consume(name) | GrammarNode::Subrule(name) => f.write_str(name),
            GrammarNode::Sequence(nodes) if nodes.is_empty() => f.write_str("ε"),
            GrammarNode::Sequence(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    if matches!(node, GrammarNode::Or(_)) {
                        write!(f, "({node})")?;
                    } else {
                        write!(f, "{node}")?;
                    }
                }
                Ok(())
            }
            GrammarNode::Or(alternatives) => {
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    if matches!(alternative, GrammarNode::Or(_)) {
                        write!(f, "({alternative})")?;
                    } else {
                        write!(f, "{alternative}")?;
                    }
                }
                Ok(())
            }
            GrammarNode::Option(node) => {
                node.fmt_operand(f)?;
                f.write_str("?")
            }
            GrammarNode::Many(node) => {
                node.fmt_operand(f)?;
                f.write_str("*")
            }
            GrammarNode::AtLeastOne(node) => {
                node.fmt_operand(f)?;
                f.write_str("+")
            }
        }
    }
}

/// Errors from [`collect_grammar`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollectError {
    #[error("`{name}` is used both as a rule name and as a token name")]
    NameClash { name: &'static str },
}

/// Collected grammar: every rule reachable from the start rule, in the order
/// they were first reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarAst {
    start: &'static str,
    rules: Vec<(&'static str, GrammarNode)>,
    index: FxHashMap<&'static str, usize>,
    tokens: Vec<&'static str>,
}

impl GrammarAst {
    /// Build from explicit rule bodies. The first rule is the start rule.
    pub fn from_rules(
        rules: impl IntoIterator<Item = (&'static str, GrammarNode)>,
    ) -> Result<Self, CollectError> {
        let rules: Vec<_> = rules.into_iter().collect();
        let start = rules.first().map_or("", |(name, _)| *name);

        let mut tokens = Vec::new();
        let mut seen = FxHashSet::default();
        for (_, body) in &rules {
            body.walk(&mut |node| {
                if let GrammarNode::Consume(name) = node {
                    if seen.insert(*name) {
                        tokens.push(*name);
                    }
                }
            });
        }

        let index: FxHashMap<_, _> = rules
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (*name, i))
            .collect();
        if let Some(name) = tokens.iter().find(|t| index.contains_key(*t)) {
            return Err(CollectError::NameClash { name: *name });
        }

        Ok(GrammarAst {
            start,
            rules,
            index,
            tokens,
        })
    }

    pub fn start(&self) -> &'static str {
        self.start
    }

    pub fn rule(&self, name: &str) -> Option<&GrammarNode> {
        self.index.get(name).map(|&i| &self.rules[i].1)
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &GrammarNode)> {
        self.rules.iter().map(|(name, body)| (*name, body))
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|(name, _)| *name)
    }

    /// Token names consumed anywhere in the grammar, in first-use order.
    pub fn tokens(&self) -> &[&'static str] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for GrammarAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, body) in &self.rules {
            writeln!(f, "{name} -> {body}")?;
        }
        Ok(())
    }
}

/// Collection state carried by a parser in collect mode.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    /// Sequences under construction, innermost last.
    frames: Vec<Vec<GrammarNode>>,
    executing: FxHashSet<&'static str>,
    /// Rules in the order they were first reached.
    order: Vec<&'static str>,
    bodies: FxHashMap<&'static str, GrammarNode>,
}

impl Collector {
    fn push(&mut self, node: GrammarNode) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(node);
        }
    }

    pub(crate) fn consume(&mut self, name: &'static str) {
        self.push(GrammarNode::Consume(name));
    }

    fn open(&mut self) {
        self.frames.push(Vec::new());
    }

    fn close(&mut self) -> GrammarNode {
        GrammarNode::sequence(self.frames.pop().unwrap_or_default())
    }

    /// Whether `name` still needs its body collected.
    fn enter(&mut self, name: &'static str) -> bool {
        if self.executing.contains(name) || self.bodies.contains_key(name) {
            return false;
        }
        self.executing.insert(name);
        self.order.push(name);
        true
    }

    fn leave(&mut self, name: &'static str, body: GrammarNode) {
        self.executing.remove(name);
        self.bodies.insert(name, body);
    }

    fn finish(mut self) -> Result<GrammarAst, CollectError> {
        let rules = self
            .order
            .iter()
            .map(|name| {
                let body = self.bodies.remove(name).unwrap_or_else(GrammarNode::empty);
                (*name, body)
            })
            .collect::<Vec<_>>();
        GrammarAst::from_rules(rules)
    }
}

impl<'a> Parser<'a> {
    fn collector(&mut self) -> Option<&mut Collector> {
        match &mut self.mode {
            Mode::Collect(collector) => Some(collector),
            Mode::Parse => None,
        }
    }

    /// Run `f` inside a fresh sequence frame and return what it appended.
    fn collect_frame(&mut self, f: &mut dyn FnMut(&mut Parser<'a>)) -> GrammarNode {
        if let Some(c) = self.collector() {
            c.open();
        }
        f(self);
        self.collector().map_or_else(GrammarNode::empty, Collector::close)
    }

    fn collect_push(&mut self, node: GrammarNode) {
        if let Some(c) = self.collector() {
            c.push(node);
        }
    }

    pub(crate) fn collect_or(&mut self, alternatives: &[Alt]) {
        let mut branches = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut run = |p: &mut Parser<'a>| alternative(p);
            branches.push(self.collect_frame(&mut run));
        }
        self.collect_push(GrammarNode::Or(branches));
    }

    pub(crate) fn collect_many(&mut self, f: &mut dyn FnMut(&mut Parser<'a>)) {
        let body = self.collect_frame(f);
        self.collect_push(GrammarNode::Many(Box::new(body)));
    }

    pub(crate) fn collect_option(&mut self, f: &mut dyn FnMut(&mut Parser<'a>)) {
        let body = self.collect_frame(f);
        self.collect_push(GrammarNode::Option(Box::new(body)));
    }

    pub(crate) fn collect_at_least_one(&mut self, f: &mut dyn FnMut(&mut Parser<'a>)) {
        let body = self.collect_frame(f);
        self.collect_push(GrammarNode::AtLeastOne(Box::new(body)));
    }

    pub(crate) fn collect_subrule(&mut self, rule: &Rule) {
        self.collect_push(GrammarNode::Subrule(rule.name));
        let fresh = self.collector().is_some_and(|c| c.enter(rule.name));
        if !fresh {
            return;
        }
        let body = subhuti_stack::with_stack(|| {
            let mut run = |p: &mut Parser<'a>| (rule.body)(p);
            self.collect_frame(&mut run)
        });
        if let Some(c) = self.collector() {
            c.leave(rule.name, body);
        }
    }
}

/// Collect the grammar reachable from `start` by running its rule bodies in
/// collect mode.
#[tracing::instrument(level = "debug", skip_all, fields(start = start.name))]
pub fn collect_grammar(start: &Rule) -> Result<GrammarAst, CollectError> {
    let mut parser = Parser::for_collection();
    parser.subrule(start);
    let collector = match parser.mode {
        Mode::Collect(collector) => collector,
        Mode::Parse => Collector::default(),
    };
    let ast = collector.finish()?;
    debug!(rules = ast.len(), tokens = ast.tokens().len(), "grammar collected");
    Ok(ast)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
