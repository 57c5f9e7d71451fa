//! Execution tracing.
//!
//! The parser feeds rule, token and `or` branch events into a
//! [`TraceRecorder`]. [`TraceRecorder::render`] turns them into an indented
//! outline where:
//! - linear call chains (each node has exactly one rule or branch child) fold
//!   into a single `A > B > C` line;
//! - a packrat hit replays the subtree recorded when the rule was first
//!   computed at that position, so memoized work stays visible.

use rustc_hash::FxHashMap;

/// How much tracing a parse does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraceMode {
    #[default]
    Off,
    /// Record events; the rendered outline lands in the parse output.
    Record,
    /// Record, and emit every outline line at `debug` level under the
    /// `subhuti::trace` target.
    Print,
}

impl TraceMode {
    #[inline]
    pub fn is_enabled(self) -> bool {
        !matches!(self, TraceMode::Off)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    RuleEnter {
        name: &'static str,
        /// Start token index.
        index: usize,
    },
    RuleExit {
        name: &'static str,
        success: bool,
    },
    Consume {
        name: &'static str,
        /// Matched text; `None` when the token did not match.
        value: Option<String>,
    },
    OrEnter {
        branch: usize,
        total: usize,
    },
    OrExit {
        branch: usize,
        success: bool,
    },
    CacheHit {
        name: &'static str,
        index: usize,
        success: bool,
    },
}

#[derive(Clone, Debug)]
enum Kind {
    Rule(&'static str),
    Branch { branch: usize, total: usize },
    Token(&'static str, Option<String>),
    Cached(&'static str),
    Root,
}

#[derive(Clone, Debug)]
struct Node {
    kind: Kind,
    index: usize,
    success: Option<bool>,
    children: Vec<Node>,
}

impl Node {
    fn new(kind: Kind, index: usize) -> Self {
        Node {
            kind,
            index,
            success: None,
            children: Vec::new(),
        }
    }

    fn is_call(&self) -> bool {
        matches!(self.kind, Kind::Rule(_) | Kind::Branch { .. })
    }

    fn label(&self) -> String {
        match &self.kind {
            Kind::Rule(name) | Kind::Cached(name) => (*name).to_owned(),
            Kind::Branch { branch, total } => format!("#{}/{total}", branch + 1),
            Kind::Token(name, Some(value)) => format!("{name} {value:?}"),
            Kind::Token(name, None) => (*name).to_owned(),
            Kind::Root => String::new(),
        }
    }
}

fn status(success: Option<bool>) -> &'static str {
    match success {
        Some(true) => " ✓",
        Some(false) => " ✗",
        None => "",
    }
}

/// Collected trace events of one parse.
#[derive(Clone, Debug, Default)]
pub struct TraceRecorder {
    events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Rebuild the call tree. Unclosed frames (an aborted parse) are closed
    /// without a status.
    fn tree(&self) -> Node {
        let mut stack = vec![Node::new(Kind::Root, 0)];
        let mut computed: FxHashMap<(&'static str, usize), Node> = FxHashMap::default();

        fn close(stack: &mut Vec<Node>, success: Option<bool>) -> Option<Node> {
            if stack.len() < 2 {
                return None;
            }
            let mut node = stack.pop()?;
            node.success = success;
            Some(node)
        }

        for event in &self.events {
            match event {
                TraceEvent::RuleEnter { name, index } => {
                    stack.push(Node::new(Kind::Rule(*name), *index));
                }
                TraceEvent::OrEnter { branch, total } => {
                    stack.push(Node::new(
                        Kind::Branch {
                            branch: *branch,
                            total: *total,
                        },
                        0,
                    ));
                }
                TraceEvent::RuleExit { success, .. } | TraceEvent::OrExit { success, .. } => {
                    if let Some(node) = close(&mut stack, Some(*success)) {
                        if let Kind::Rule(name) = node.kind {
                            computed.insert((name, node.index), node.clone());
                        }
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
                TraceEvent::Consume { name, value } => {
                    let mut leaf = Node::new(Kind::Token(*name, value.clone()), 0);
                    leaf.success = Some(value.is_some());
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(leaf);
                    }
                }
                TraceEvent::CacheHit {
                    name,
                    index,
                    success,
                } => {
                    let mut hit = Node::new(Kind::Cached(*name), *index);
                    hit.success = Some(*success);
                    if let Some(original) = computed.get(&(*name, *index)) {
                        hit.children.clone_from(&original.children);
                    }
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(hit);
                    }
                }
            }
        }

        while let Some(node) = close(&mut stack, None) {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
        }
        stack.pop().unwrap_or_else(|| Node::new(Kind::Root, 0))
    }

    /// Outline lines, two spaces of indent per level.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for child in &self.tree().children {
            render(child, 0, &mut out);
        }
        out
    }

    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }
}

fn render(node: &Node, depth: usize, out: &mut Vec<String>) {
    let indent = "  ".repeat(depth);

    if let Kind::Cached(_) = node.kind {
        out.push(format!(
            "{indent}{} (cached){}",
            node.label(),
            status(node.success)
        ));
        for child in &node.children {
            render(child, depth + 1, out);
        }
        return;
    }

    let mut labels = vec![node.label()];
    let mut last = node;
    while node.is_call() && last.children.len() == 1 && last.children[0].is_call() {
        last = &last.children[0];
        labels.push(last.label());
    }
    out.push(format!("{indent}{}{}", labels.join(" > "), status(last.success)));
    for child in &last.children {
        render(child, depth + 1, out);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
