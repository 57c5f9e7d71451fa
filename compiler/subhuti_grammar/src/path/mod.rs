//! Symbol paths produced by grammar expansion.
//!
//! A path is a sequence of token names (and, in BFS levels or at recursive
//! references, rule names). It is `complete` when it spells out an entire
//! expansion; a path cut at its length bound, or ending in an unexpanded
//! reference, is incomplete and stands for every longer path it prefixes.

mod trie;

use std::collections::BTreeSet;
use std::fmt;

use smallvec::SmallVec;

pub use trie::PathTrie;

/// A token or rule name.
pub type Symbol = &'static str;

/// Sorted, deduplicated set of paths.
pub(crate) type PathSet = BTreeSet<Path>;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    symbols: SmallVec<[Symbol; 4]>,
    complete: bool,
}

impl Path {
    /// The complete empty path.
    pub fn empty() -> Path {
        Path {
            symbols: SmallVec::new(),
            complete: true,
        }
    }

    pub fn new(symbols: impl IntoIterator<Item = Symbol>, complete: bool) -> Path {
        Path {
            symbols: symbols.into_iter().collect(),
            complete,
        }
    }

    /// Incomplete empty path: something follows, but nothing of it is known.
    pub(crate) fn unknown() -> Path {
        Path {
            symbols: SmallVec::new(),
            complete: false,
        }
    }

    pub(crate) fn symbol(symbol: Symbol) -> Path {
        Path {
            symbols: SmallVec::from_slice(&[symbol]),
            complete: true,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn starts_with(&self, prefix: &[Symbol]) -> bool {
        self.symbols.starts_with(prefix)
    }

    /// Mark as incomplete.
    pub(crate) fn closed(mut self) -> Path {
        self.complete = false;
        self
    }

    /// Cut to `bound` symbols; a cut path is incomplete.
    pub(crate) fn truncated(mut self, bound: usize) -> Path {
        if self.symbols.len() > bound {
            self.symbols.truncate(bound);
            self.complete = false;
        }
        self
    }

    /// `self` followed by `next`, cut to `bound`. An incomplete path absorbs
    /// whatever follows it.
    pub(crate) fn concat(&self, next: &Path, bound: usize) -> Path {
        if !self.complete {
            return self.clone();
        }
        let mut symbols = self.symbols.clone();
        symbols.extend_from_slice(&next.symbols);
        Path {
            symbols,
            complete: next.complete,
        }
        .truncated(bound)
    }
}

/// Space-separated symbols; `...` marks an incomplete path and `ε` the
/// complete empty one.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbols.is_empty() {
            return f.write_str(if self.complete { "ε" } else { "..." });
        }
        f.write_str(&self.symbols.join(" "))?;
        if !self.complete {
            f.write_str(" ...")?;
        }
        Ok(())
    }
}

/// Every path of `prefixes` followed by every path of `suffixes`.
pub(crate) fn concat_sets(prefixes: &PathSet, suffixes: &PathSet, bound: usize) -> PathSet {
    let mut out = PathSet::new();
    for prefix in prefixes {
        if !prefix.complete {
            out.insert(prefix.clone());
            continue;
        }
        for suffix in suffixes {
            out.insert(prefix.concat(suffix, bound));
        }
    }
    out
}

pub(crate) fn truncate_set<'p>(paths: impl IntoIterator<Item = &'p Path>, bound: usize) -> PathSet {
    paths
        .into_iter()
        .map(|p| p.clone().truncated(bound))
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
