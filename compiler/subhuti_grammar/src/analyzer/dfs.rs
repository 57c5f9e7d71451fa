//! First-K expansion.

use std::rc::Rc;

use subhuti_parse::GrammarNode;
use tracing::{debug, trace};

use super::{Frame, GrammarAnalyzer, LeftRecursion};
use crate::path::{concat_sets, truncate_set, Path, PathSet, Symbol};
use crate::AnalysisError;

impl GrammarAnalyzer {
    /// Paths of at most `budget` symbols that `node` can start with.
    pub(crate) fn expand(
        &mut self,
        node: &GrammarNode,
        budget: usize,
    ) -> Result<PathSet, AnalysisError> {
        if budget == 0 {
            let path = if node.is_empty() {
                Path::empty()
            } else {
                Path::unknown()
            };
            return Ok(PathSet::from([path]));
        }
        match node {
            GrammarNode::Consume(token) => Ok(PathSet::from([Path::symbol(*token)])),
            GrammarNode::Subrule(rule) => self.rule_paths(*rule, budget),
            GrammarNode::Sequence(children) => self.expand_sequence(children, budget),
            GrammarNode::Or(alternatives) => {
                let mut out = PathSet::new();
                for alternative in alternatives {
                    out.extend(self.expand(alternative, budget)?);
                }
                Ok(out)
            }
            GrammarNode::Option(body) => {
                let mut out = self.expand(body, budget)?;
                out.insert(Path::empty());
                Ok(out)
            }
            GrammarNode::Many(body) => {
                let iteration = self.expand(body, budget)?;
                Ok(repeat(&iteration, PathSet::from([Path::empty()]), budget))
            }
            GrammarNode::AtLeastOne(body) => {
                let iteration = self.expand(body, budget)?;
                Ok(repeat(&iteration, iteration.clone(), budget))
            }
        }
    }

    /// Each child is expanded only as far as the shortest still-open prefix
    /// allows; the loop ends once every prefix is closed.
    fn expand_sequence(
        &mut self,
        children: &[GrammarNode],
        budget: usize,
    ) -> Result<PathSet, AnalysisError> {
        let left_from = self.left_from;
        let mut acc = PathSet::from([Path::empty()]);
        let mut result = Ok(());
        for child in children {
            let Some(shortest) = acc.iter().filter(|p| p.is_complete()).map(Path::len).min() else {
                break;
            };
            match self.expand(child, budget - shortest) {
                Ok(paths) => {
                    if !paths.iter().any(Path::is_empty) {
                        // Rules already on the stack are past their left edge.
                        self.left_from = self.stack.len();
                    }
                    acc = concat_sets(&acc, &paths, budget);
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.left_from = left_from;
        result.map(|()| acc)
    }

    pub(crate) fn rule_paths(
        &mut self,
        rule: Symbol,
        budget: usize,
    ) -> Result<PathSet, AnalysisError> {
        if let Some(paths) = self.dfs_first_k.get(rule) {
            self.dfs_cache_hits += 1;
            return Ok(truncate_set(paths, budget));
        }

        if let Some(index) = self.stack.iter().position(|f| f.rule == rule) {
            if index >= self.left_from {
                self.note_left_recursion(index, rule);
            }
            for frame in &mut self.stack[index + 1..] {
                frame.min_ref = frame.min_ref.min(index);
            }
            return Ok(PathSet::from([Path::symbol(rule).closed()]));
        }

        let grammar = Rc::clone(&self.grammar);
        let Some(body) = grammar.rule(rule) else {
            return Ok(PathSet::from([Path::symbol(rule).closed()]));
        };
        self.check_time(rule)?;

        let k = self.config.k;
        let depth = self.stack.len();
        self.stack.push(Frame {
            rule,
            min_ref: usize::MAX,
        });
        let result = subhuti_stack::with_stack(|| self.expand(body, k));
        let frame = self.stack.pop();
        let paths = result?;

        if let Some(path) = paths.iter().find(|p| p.len() > k) {
            return Err(AnalysisError::PathBoundExceeded {
                rule,
                len: path.len(),
                bound: k,
            });
        }
        trace!(rule, paths = paths.len(), "first-k expanded");
        if frame.is_some_and(|f| f.min_ref >= depth) {
            self.dfs_first_k.insert(rule, paths.clone());
        }
        Ok(truncate_set(&paths, budget))
    }

    fn note_left_recursion(&mut self, index: usize, rule: Symbol) {
        let mut chain: Vec<Symbol> = self.stack[index..].iter().map(|f| f.rule).collect();
        chain.push(rule);

        let mut key = chain.clone();
        key.sort_unstable();
        key.dedup();
        if !self.cycle_keys.insert(key) {
            return;
        }
        debug!(rule, chain = %chain.join(" -> "), "left recursion");
        self.left_recursions.push(LeftRecursion { rule, chain });
    }
}

/// `seed` followed by any number of `iteration`s.
fn repeat(iteration: &PathSet, seed: PathSet, budget: usize) -> PathSet {
    let mut frontier: PathSet = seed.iter().filter(|p| p.is_complete()).cloned().collect();
    let mut out = seed;
    while !frontier.is_empty() {
        let next = concat_sets(&frontier, iteration, budget);
        frontier = PathSet::new();
        for path in next {
            if out.insert(path.clone()) && path.is_complete() {
                frontier.insert(path);
            }
        }
    }
    out
}
