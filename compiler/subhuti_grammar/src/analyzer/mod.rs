//! Grammar path analyzer.
//!
//! Expands a collected [`GrammarAst`] into symbol paths two ways:
//!
//! - **First-K (DFS)**: every token sequence of length at most K a rule can
//!   start with. Rule results are cached in `dfs_first_k`. Left recursion is
//!   detected here, as a rule re-entered on the expansion stack before anything
//!   was consumed.
//! - **BFS levels**: the body of a rule with subrules left as symbols (level 1),
//!   then one round of subrule substitution per further level. Levels are cached
//!   per (rule, level) in `bfs_level` and built incrementally from the nearest
//!   cached lower level; `bfs_all` caches the union of levels `1..=L`.
//!
//! The caches belong to the grammar and stay valid until [`invalidate`] is
//! called.
//!
//! [`invalidate`]: GrammarAnalyzer::invalidate

mod bfs;
mod dfs;

use std::rc::Rc;
use std::time::{Duration, Instant};

use rustc_hash::{FxHashMap, FxHashSet};
use subhuti_parse::{collect_grammar, CollectError, GrammarAst, GrammarNode, Rule};
use tracing::debug;

use crate::path::{Path, PathSet, Symbol};
use crate::{AnalysisConfig, AnalysisError};

/// A left-recursive cycle found during First-K expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeftRecursion {
    /// Rule the cycle was entered through.
    pub rule: &'static str,
    /// Rules from `rule` back to `rule`, both ends included.
    pub chain: Vec<&'static str>,
}

impl LeftRecursion {
    pub fn is_direct(&self) -> bool {
        self.chain.len() == 2
    }
}

/// Entry counts of the three analysis caches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheSizes {
    pub dfs_first_k: usize,
    pub bfs_level: usize,
    pub bfs_all: usize,
}

/// A rule on the DFS expansion stack.
#[derive(Copy, Clone, Debug)]
struct Frame {
    rule: &'static str,
    /// Lowest stack index referenced from inside this frame; below its own
    /// depth the result depends on the caller and is not cached.
    min_ref: usize,
}

pub struct GrammarAnalyzer {
    grammar: Rc<GrammarAst>,
    config: AnalysisConfig,
    dfs_first_k: FxHashMap<Symbol, PathSet>,
    bfs_level: FxHashMap<(Symbol, usize), PathSet>,
    bfs_all: FxHashMap<(Symbol, usize), PathSet>,
    left_recursions: Vec<LeftRecursion>,
    /// Rule sets of the cycles already reported.
    cycle_keys: FxHashSet<Vec<Symbol>>,
    dfs_cache_hits: usize,
    bfs_time: Duration,
    started: Option<Instant>,
    stack: Vec<Frame>,
    /// Stack index from which a re-entry still counts as left recursion.
    left_from: usize,
}

impl GrammarAnalyzer {
    pub fn new(grammar: GrammarAst, config: AnalysisConfig) -> Self {
        GrammarAnalyzer {
            grammar: Rc::new(grammar),
            config,
            dfs_first_k: FxHashMap::default(),
            bfs_level: FxHashMap::default(),
            bfs_all: FxHashMap::default(),
            left_recursions: Vec::new(),
            cycle_keys: FxHashSet::default(),
            dfs_cache_hits: 0,
            bfs_time: Duration::ZERO,
            started: None,
            stack: Vec::new(),
            left_from: 0,
        }
    }

    /// Collect the grammar reachable from `start` and wrap it.
    pub fn from_rule(start: &Rule, config: AnalysisConfig) -> Result<Self, CollectError> {
        Ok(Self::new(collect_grammar(start)?, config))
    }

    pub fn grammar(&self) -> &GrammarAst {
        &self.grammar
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the configuration. Cached paths depend on K and the BFS limits,
    /// so the caches are dropped.
    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Sorted First-K paths of `rule`.
    ///
    /// A name without a body expands to an opaque, incomplete reference.
    pub fn first_k(&mut self, rule: &'static str) -> Result<Vec<Path>, AnalysisError> {
        let k = self.config.k;
        self.timed(|a| a.rule_paths(rule, k))
            .map(|paths| paths.into_iter().collect())
    }

    /// Sorted First-K paths of an arbitrary node, typically one `or`
    /// alternative.
    pub fn first_k_node(&mut self, node: &GrammarNode) -> Result<Vec<Path>, AnalysisError> {
        let k = self.config.k;
        self.timed(|a| a.expand(node, k))
            .map(|paths| paths.into_iter().collect())
    }

    /// Sorted BFS paths of `rule` at exactly `level` (clamped to at least 1).
    pub fn level_paths(
        &mut self,
        rule: &'static str,
        level: usize,
    ) -> Result<Vec<Path>, AnalysisError> {
        let level = level.max(1);
        self.timed(|a| a.level(rule, level))
            .map(|paths| paths.into_iter().collect())
    }

    /// Sorted union of the BFS levels `1..=level` of `rule`.
    pub fn all_levels(
        &mut self,
        rule: &'static str,
        level: usize,
    ) -> Result<Vec<Path>, AnalysisError> {
        let level = level.max(1);
        self.timed(|a| a.levels_up_to(rule, level))
            .map(|paths| paths.into_iter().collect())
    }

    /// Every left-recursive cycle of the grammar, each reported once.
    pub fn left_recursions(&mut self) -> Result<Vec<LeftRecursion>, AnalysisError> {
        self.expand_all_rules()?;
        Ok(self.left_recursions.clone())
    }

    /// Run First-K over every rule, filling the DFS cache.
    pub(crate) fn expand_all_rules(&mut self) -> Result<(), AnalysisError> {
        let grammar = Rc::clone(&self.grammar);
        for rule in grammar.rule_names() {
            self.first_k(rule)?;
        }
        Ok(())
    }

    /// Drop every cache and every recorded cycle.
    pub fn invalidate(&mut self) {
        debug!("analysis caches invalidated");
        self.dfs_first_k.clear();
        self.bfs_level.clear();
        self.bfs_all.clear();
        self.left_recursions.clear();
        self.cycle_keys.clear();
        self.dfs_cache_hits = 0;
        self.bfs_time = Duration::ZERO;
    }

    pub fn cache_sizes(&self) -> CacheSizes {
        CacheSizes {
            dfs_first_k: self.dfs_first_k.len(),
            bfs_level: self.bfs_level.len(),
            bfs_all: self.bfs_all.len(),
        }
    }

    pub fn dfs_cache_hits(&self) -> usize {
        self.dfs_cache_hits
    }

    pub(crate) fn bfs_time(&self) -> Duration {
        self.bfs_time
    }

    pub(crate) fn shared_grammar(&self) -> Rc<GrammarAst> {
        Rc::clone(&self.grammar)
    }

    /// Run `f` under the analysis clock. Nested calls share the outermost
    /// start time; the expansion stack is reset when the outermost call ends.
    pub(crate) fn timed<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, AnalysisError>,
    ) -> Result<R, AnalysisError> {
        if self.started.is_some() {
            return f(self);
        }
        self.started = Some(Instant::now());
        let result = f(self);
        self.started = None;
        self.stack.clear();
        self.left_from = 0;
        result
    }

    fn check_time(&self, rule: &'static str) -> Result<(), AnalysisError> {
        match self.started {
            Some(start) if start.elapsed() >= self.config.timeout => Err(AnalysisError::Timeout {
                rule,
                elapsed: start.elapsed(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
