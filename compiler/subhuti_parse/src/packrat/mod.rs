//! Packrat memoization.
//!
//! Every rule outcome is stored under (rule name, start token index). On
//! source input the code index is part of the key too, since contextual
//! lexing can reach the same token count at different offsets. An entry is
//! written once per parse: the first computation at a position is the only
//! one, which bounds the number of rule computations by rules × positions.

use rustc_hash::FxHashMap;

use crate::parser::{StartKey, State};
use crate::CstNode;

pub(crate) type PackratKey = (&'static str, StartKey);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PackratEntry {
    /// Parser state after the rule (the start state for failures).
    pub(crate) end: State,
    /// The rule's node, for successes.
    pub(crate) cst: Option<CstNode>,
    pub(crate) success: bool,
    /// Number of tokens the rule consumed.
    pub(crate) consumed: usize,
}

#[derive(Debug, Default)]
pub(crate) struct PackratCache {
    entries: FxHashMap<PackratKey, PackratEntry>,
}

impl PackratCache {
    pub(crate) fn get(&self, key: &PackratKey) -> Option<&PackratEntry> {
        self.entries.get(key)
    }

    /// Store `entry` unless the key is already filled. Returns whether it was stored.
    pub(crate) fn insert(&mut self, key: PackratKey, entry: PackratEntry) -> bool {
        match self.entries.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Work counters of one parse.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseStats {
    /// Rule bodies actually executed.
    pub rule_computations: usize,
    /// Rule calls answered from the packrat cache.
    pub cache_hits: usize,
    /// Tokens consumed by `consume`, excluding cache replays.
    pub tokens_consumed: usize,
    /// Entries in the packrat cache when the parse ended.
    pub cache_entries: usize,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
