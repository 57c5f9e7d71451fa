use rustc_hash::FxHashMap;

use super::Symbol;

/// Prefix tree over symbol sequences with values attached to nodes.
///
/// Conflict detection inserts the paths of earlier alternatives and then asks,
/// for each path of a later alternative, which earlier paths are its prefixes
/// and which extend it.
#[derive(Clone, Debug)]
pub struct PathTrie<V> {
    nodes: Vec<TrieNode<V>>,
    len: usize,
}

#[derive(Clone, Debug)]
struct TrieNode<V> {
    children: FxHashMap<Symbol, usize>,
    entries: Vec<V>,
}

impl<V> TrieNode<V> {
    fn new() -> Self {
        TrieNode {
            children: FxHashMap::default(),
            entries: Vec::new(),
        }
    }
}

impl<V> Default for PathTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PathTrie<V> {
    pub fn new() -> Self {
        PathTrie {
            nodes: vec![TrieNode::new()],
            len: 0,
        }
    }

    pub fn insert(&mut self, symbols: &[Symbol], value: V) {
        let mut node = 0;
        for &symbol in symbols {
            node = match self.nodes[node].children.get(symbol) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::new());
                    self.nodes[node].children.insert(symbol, child);
                    child
                }
            };
        }
        self.nodes[node].entries.push(value);
        self.len += 1;
    }

    /// Values stored at `symbols` or at any of its prefixes, shortest first.
    pub fn prefix_entries(&self, symbols: &[Symbol]) -> Vec<&V> {
        let mut out: Vec<&V> = self.nodes[0].entries.iter().collect();
        let mut node = 0;
        for symbol in symbols {
            match self.nodes[node].children.get(symbol) {
                Some(&child) => {
                    node = child;
                    out.extend(self.nodes[node].entries.iter());
                }
                None => break,
            }
        }
        out
    }

    /// Values stored strictly below `symbols`, i.e. at paths it is a proper
    /// prefix of.
    pub fn entries_below(&self, symbols: &[Symbol]) -> Vec<&V> {
        let Some(start) = self.find(symbols) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut pending: Vec<usize> = self.nodes[start].children.values().copied().collect();
        while let Some(node) = pending.pop() {
            out.extend(self.nodes[node].entries.iter());
            pending.extend(self.nodes[node].children.values().copied());
        }
        out
    }

    fn find(&self, symbols: &[Symbol]) -> Option<usize> {
        symbols
            .iter()
            .try_fold(0, |node, symbol| self.nodes[node].children.get(symbol).copied())
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
