//! Concrete syntax tree.
//!
//! Rule nodes carry the rule name and their children; leaf nodes carry the
//! token name and the matched text. Every consumed token ends up as a leaf, so
//! the tree reproduces the significant part of the input exactly.

use std::fmt;

use subhuti_ir::{Span, Token};

/// Name of the nodes that error recovery inserts around skipped input.
pub const ERROR_NODE: &str = "Error";

/// A node of the concrete syntax tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CstNode {
    /// Rule name, or token name for leaves.
    pub name: &'static str,
    children: Vec<CstNode>,
    /// Matched text; set for leaves only.
    pub value: Option<String>,
    /// Covered source range. Leaves take their token's span; rule nodes span
    /// from their first to their last located child.
    pub loc: Option<Span>,
}

impl CstNode {
    /// An empty rule node.
    pub fn new(name: &'static str) -> Self {
        CstNode {
            name,
            children: Vec::new(),
            value: None,
            loc: None,
        }
    }

    pub fn leaf(token: &Token) -> Self {
        CstNode {
            name: token.name,
            children: Vec::new(),
            value: Some(token.value.clone()),
            loc: Some(token.span),
        }
    }

    /// Rule node built from finished children.
    pub fn with_children(name: &'static str, children: Vec<CstNode>) -> Self {
        let mut node = CstNode {
            name,
            children,
            value: None,
            loc: None,
        };
        node.finish();
        node
    }

    /// Error node wrapping a partial parse and the tokens that were skipped.
    pub fn error(partial: Vec<CstNode>, skipped: &[Token]) -> Self {
        let mut children = partial;
        children.extend(skipped.iter().map(CstNode::leaf));
        Self::with_children(ERROR_NODE, children)
    }

    /// Ordered children; `None` when there are none.
    pub fn children(&self) -> Option<&[CstNode]> {
        if self.children.is_empty() {
            None
        } else {
            Some(&self.children)
        }
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> Option<&CstNode> {
        self.children.get(index)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.name == ERROR_NODE
    }

    /// Whether this node or any descendant is an error node.
    pub fn has_errors(&self) -> bool {
        self.is_error() || self.children.iter().any(CstNode::has_errors)
    }

    /// First direct child with the given name.
    pub fn find_child(&self, name: &str) -> Option<&CstNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn find_children<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s CstNode> + 's {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Leaves in source order.
    pub fn tokens(&self) -> Vec<&CstNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'s>(&'s self, out: &mut Vec<&'s CstNode>) {
        if self.is_leaf() {
            out.push(self);
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Leaf values joined by single spaces.
    pub fn text(&self) -> String {
        let leaves = self.tokens();
        let mut text = String::new();
        for (i, leaf) in leaves.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(leaf.value.as_deref().unwrap_or_default());
        }
        text
    }

    /// Number of nodes in the subtree, this one included.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CstNode::size).sum::<usize>()
    }

    pub(crate) fn push(&mut self, child: CstNode) {
        self.children.push(child);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.children.truncate(len);
    }

    pub(crate) fn take_children(&mut self) -> Vec<CstNode> {
        std::mem::take(&mut self.children)
    }

    /// Derive `loc` from the first and last located children.
    pub(crate) fn finish(&mut self) {
        if self.is_leaf() {
            return;
        }
        let first = self.children.iter().find_map(|c| c.loc);
        let last = self.children.iter().rev().find_map(|c| c.loc);
        self.loc = match (first, last) {
            (Some(first), Some(last)) => Some(first.to(last)),
            _ => None,
        };
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.name, indent = depth * 2)?;
        if let Some(value) = &self.value {
            write!(f, " {value:?}")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

/// One node per line, children indented by two spaces.
impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
