//! Parse-record tree.
//!
//! While recovery is on, every rule attempt (successful or not), every
//! consumed token and every packrat replay leaves a record with its token
//! range. Failed attempts are kept, so after an item fails the best partial
//! CST can be rebuilt from what was matched before the failure.

use crate::CstNode;

#[derive(Debug)]
enum RecordKind {
    Rule { name: &'static str, success: bool },
    /// A consumed token or a replayed packrat subtree.
    Node(CstNode),
}

#[derive(Debug)]
struct Record {
    kind: RecordKind,
    parent: Option<usize>,
    start: usize,
    end: usize,
    /// Farthest token position reached by any descendant.
    reach: usize,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct RecordTree {
    records: Vec<Record>,
    /// Rule records not yet closed, innermost last.
    open: Vec<usize>,
}

impl RecordTree {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// The innermost open rule record.
    pub(crate) fn current(&self) -> Option<usize> {
        self.open.last().copied()
    }

    fn push(&mut self, kind: RecordKind, start: usize, end: usize) -> usize {
        let idx = self.records.len();
        let parent = self.current();
        self.records.push(Record {
            kind,
            parent,
            start,
            end,
            reach: end,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.records[parent].children.push(idx);
        }
        idx
    }

    fn extend_reach(&mut self, parent: Option<usize>, end: usize) {
        if let Some(parent) = parent {
            let record = &mut self.records[parent];
            record.reach = record.reach.max(end);
        }
    }

    pub(crate) fn open(&mut self, name: &'static str, start: usize) -> usize {
        let idx = self.push(
            RecordKind::Rule {
                name,
                success: false,
            },
            start,
            start,
        );
        self.open.push(idx);
        idx
    }

    /// Close a rule record. A failed rule still spans everything its
    /// children matched before it gave up.
    pub(crate) fn close(&mut self, idx: usize, end: usize, success: bool) {
        if let Some(at) = self.open.iter().rposition(|&i| i == idx) {
            self.open.truncate(at);
        }
        let Some(record) = self.records.get_mut(idx) else {
            return;
        };
        if let RecordKind::Rule { success: s, .. } = &mut record.kind {
            *s = success;
        }
        record.end = if success { end } else { end.max(record.reach) };
        record.reach = record.reach.max(record.end);
        let (parent, reach) = (record.parent, record.reach);
        self.extend_reach(parent, reach);
    }

    pub(crate) fn leaf(&mut self, leaf: CstNode, start: usize) {
        self.node(leaf, start, start + 1);
    }

    pub(crate) fn replay(&mut self, cst: CstNode, start: usize, end: usize) {
        self.node(cst, start, end);
    }

    fn node(&mut self, node: CstNode, start: usize, end: usize) {
        let idx = self.push(RecordKind::Node(node), start, end);
        let parent = self.records[idx].parent;
        self.extend_reach(parent, end);
    }

    /// Rebuild the partial CST for tokens `start..bound` from the records
    /// created since `mark` directly under `scope`.
    ///
    /// Returns the nodes and the token position they cover up to.
    pub(crate) fn rebuild(
        &self,
        mark: usize,
        scope: Option<usize>,
        start: usize,
        bound: usize,
    ) -> (Vec<CstNode>, usize) {
        let roots: Vec<usize> = (mark..self.records.len())
            .filter(|&i| self.records[i].parent == scope)
            .collect();
        self.chain(&roots, start, bound)
    }

    /// Greedily cover `start..bound`, taking at each position the record
    /// that reaches farthest. Rule records are clipped to `bound`.
    fn chain(&self, candidates: &[usize], start: usize, bound: usize) -> (Vec<CstNode>, usize) {
        let mut nodes = Vec::new();
        let mut cur = start;
        loop {
            let best = candidates
                .iter()
                .map(|&i| &self.records[i])
                .filter(|r| r.start == cur)
                .filter_map(|r| self.to_node(r, bound))
                .filter(|(_, end)| *end > cur)
                .max_by_key(|(_, end)| *end);
            let Some((node, end)) = best else {
                break;
            };
            nodes.push(node);
            cur = end;
        }
        (nodes, cur)
    }

    fn to_node(&self, record: &Record, bound: usize) -> Option<(CstNode, usize)> {
        match &record.kind {
            RecordKind::Node(node) => {
                (record.end <= bound).then(|| (node.clone(), record.end))
            }
            RecordKind::Rule { name, .. } => {
                let (children, end) = self.chain(&record.children, record.start, bound);
                Some((CstNode::with_children(name, children), end))
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
