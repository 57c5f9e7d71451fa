//! Per-parse memoization of on-demand lexing.
//!
//! A backtracking parser asks for the token at the same position many times.
//! The lexed result depends on more than the position: the goal, the previous
//! token (context constraints) and the template depth all change the outcome,
//! so all four make up the key.

use rustc_hash::FxHashMap;
use subhuti_ir::Position;

use crate::{LexError, LexedToken, Lexer, LexicalGoal};

type Key = (usize, LexicalGoal, Option<&'static str>, u32);

/// Hit/miss counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LexCacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// Cache in front of [`Lexer::read_token_at`]. Cleared at the start of every
/// top-level parse.
#[derive(Debug, Default)]
pub struct LexCache {
    entries: FxHashMap<Key, Result<Option<LexedToken>, LexError>>,
    stats: LexCacheStats,
}

impl LexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached [`Lexer::read_token_at`].
    pub fn read_token_at(
        &mut self,
        lexer: &Lexer,
        source: &str,
        start: Position,
        goal: LexicalGoal,
        last_token: Option<&'static str>,
        template_depth: u32,
    ) -> Result<Option<LexedToken>, LexError> {
        let key = (start.index, goal, last_token, template_depth);
        if let Some(cached) = self.entries.get(&key) {
            self.stats.hits += 1;
            return cached.clone();
        }
        self.stats.misses += 1;
        let result = lexer.read_token_at(source, start, goal, last_token, template_depth);
        self.entries.insert(key, result.clone());
        result
    }

    pub fn stats(&self) -> LexCacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = LexCacheStats::default();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
