//! Level-by-level expansion.

use std::rc::Rc;
use std::time::Instant;

use subhuti_parse::GrammarNode;
use tracing::{debug, trace};

use super::GrammarAnalyzer;
use crate::path::{concat_sets, Path, PathSet, Symbol};
use crate::AnalysisError;

impl GrammarAnalyzer {
    /// Level-1 shape of `node`: subrules stay as symbols, `Many` contributes
    /// zero, one or two iterations.
    pub(crate) fn structural(&self, node: &GrammarNode) -> PathSet {
        let bound = self.config.bfs_max_len;
        let paths = match node {
            GrammarNode::Consume(symbol) | GrammarNode::Subrule(symbol) => {
                PathSet::from([Path::symbol(*symbol)])
            }
            GrammarNode::Sequence(children) => {
                let mut acc = PathSet::from([Path::empty()]);
                for child in children {
                    acc = concat_sets(&acc, &self.structural(child), bound);
                    acc = self.capped(acc);
                }
                acc
            }
            GrammarNode::Or(alternatives) => alternatives
                .iter()
                .flat_map(|alternative| self.structural(alternative))
                .collect(),
            GrammarNode::Option(body) => {
                let mut out = self.structural(body);
                out.insert(Path::empty());
                out
            }
            GrammarNode::Many(body) => {
                let once = self.structural(body);
                let mut out = concat_sets(&once, &once, bound);
                out.extend(once);
                out.insert(Path::empty());
                out
            }
            GrammarNode::AtLeastOne(body) => {
                let once = self.structural(body);
                let mut out = concat_sets(&once, &once, bound);
                out.extend(once);
                out
            }
        };
        self.capped(paths)
    }

    /// Replace every rule symbol by each of its level-1 paths.
    pub(crate) fn substitute(&mut self, paths: &PathSet) -> Result<PathSet, AnalysisError> {
        let bound = self.config.bfs_max_len;
        let grammar = Rc::clone(&self.grammar);
        let mut out = PathSet::new();
        for path in paths {
            let mut expanded = PathSet::from([Path::empty()]);
            for &symbol in path.symbols() {
                let step = if grammar.has_rule(symbol) {
                    self.level_one(symbol)?
                } else {
                    PathSet::from([Path::symbol(symbol)])
                };
                expanded = self.capped(concat_sets(&expanded, &step, bound));
            }
            if path.is_complete() {
                out.extend(expanded);
            } else {
                out.extend(expanded.into_iter().map(Path::closed));
            }
            if out.len() >= self.config.max_bfs_paths {
                break;
            }
        }
        Ok(self.capped(out))
    }

    fn level_one(&mut self, rule: Symbol) -> Result<PathSet, AnalysisError> {
        if let Some(paths) = self.bfs_level.get(&(rule, 1)) {
            return Ok(paths.clone());
        }
        self.check_time(rule)?;
        let grammar = Rc::clone(&self.grammar);
        let paths = match grammar.rule(rule) {
            Some(body) => self.structural(body),
            None => PathSet::from([Path::symbol(rule)]),
        };
        self.bfs_level.insert((rule, 1), paths.clone());
        Ok(paths)
    }

    /// Paths of `rule` at `level`, starting from the deepest cached level
    /// below it.
    pub(crate) fn level(&mut self, rule: Symbol, level: usize) -> Result<PathSet, AnalysisError> {
        if let Some(paths) = self.bfs_level.get(&(rule, level)) {
            return Ok(paths.clone());
        }
        let started = Instant::now();
        let cached = (2..level)
            .rev()
            .find_map(|l| self.bfs_level.get(&(rule, l)).map(|p| (l, p.clone())));
        let (mut current, mut paths) = match cached {
            Some(found) => found,
            None => (1, self.level_one(rule)?),
        };
        trace!(rule, from = current, to = level, "bfs levels");
        while current < level {
            self.check_time(rule)?;
            paths = self.substitute(&paths)?;
            current += 1;
            self.bfs_level.insert((rule, current), paths.clone());
        }
        self.bfs_time += started.elapsed();
        Ok(paths)
    }

    pub(crate) fn levels_up_to(
        &mut self,
        rule: Symbol,
        level: usize,
    ) -> Result<PathSet, AnalysisError> {
        if let Some(paths) = self.bfs_all.get(&(rule, level)) {
            return Ok(paths.clone());
        }
        let mut out = PathSet::new();
        for l in 1..=level {
            out.extend(self.level(rule, l)?);
        }
        self.bfs_all.insert((rule, level), out.clone());
        Ok(out)
    }

    /// First path of `node`, at some level up to `max_level`, that strictly
    /// extends `prefix`, together with its level.
    pub(crate) fn find_extension(
        &mut self,
        node: &GrammarNode,
        prefix: &[Symbol],
    ) -> Result<Option<(usize, Path)>, AnalysisError> {
        let started = Instant::now();
        let mut paths = self.structural(node);
        let mut found = None;
        for level in 1..=self.config.max_level {
            if level > 1 {
                paths = self.substitute(&paths)?;
            }
            if let Some(path) = paths
                .iter()
                .find(|p| p.len() > prefix.len() && p.starts_with(prefix))
            {
                found = Some((level, path.clone()));
                break;
            }
        }
        self.bfs_time += started.elapsed();
        Ok(found)
    }

    /// Union of the BFS levels `1..=max_level` of `node`.
    pub(crate) fn node_levels(&mut self, node: &GrammarNode) -> Result<PathSet, AnalysisError> {
        let started = Instant::now();
        let mut paths = self.structural(node);
        let mut out = paths.clone();
        for _ in 1..self.config.max_level {
            paths = self.substitute(&paths)?;
            out.extend(paths.iter().cloned());
        }
        self.bfs_time += started.elapsed();
        Ok(self.capped(out))
    }

    fn capped(&self, paths: PathSet) -> PathSet {
        let max = self.config.max_bfs_paths;
        if paths.len() <= max {
            return paths;
        }
        debug!(kept = max, dropped = paths.len() - max, "bfs path set capped");
        paths.into_iter().take(max).collect()
    }
}
