//! Backtracking snapshots.

use super::State;
use crate::Parser;

/// Everything needed to undo speculative work: the position and the number
/// of children already attached to the node under construction.
///
/// Restoring truncates that node's children back to the saved count, so
/// whatever an abandoned alternative attached disappears with it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParserSnapshot {
    pub(crate) state: State,
    pub(crate) child_count: usize,
}

impl ParserSnapshot {
    #[inline]
    pub fn code_index(&self) -> usize {
        self.state.code_index()
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.state.pos.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.state.pos.column
    }

    #[inline]
    pub fn token_index(&self) -> usize {
        self.state.token_pos
    }

    #[inline]
    pub fn last_token(&self) -> Option<&'static str> {
        self.state.last_token
    }

    #[inline]
    pub fn template_depth(&self) -> u32 {
        self.state.template_depth
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.child_count
    }
}

impl Parser<'_> {
    pub fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            state: self.state,
            child_count: self.child_count(),
        }
    }

    /// Return to `snapshot`. The success flag is left alone.
    pub fn restore(&mut self, snapshot: ParserSnapshot) {
        self.state = snapshot.state;
        if let Some(top) = self.stack.last_mut() {
            top.truncate(snapshot.child_count);
        }
    }

    /// Whether anything was consumed or attached since `snapshot`.
    #[inline]
    pub(crate) fn changed_since(&self, snapshot: ParserSnapshot) -> bool {
        self.state != snapshot.state || self.child_count() != snapshot.child_count
    }

    /// Whether input was consumed since `snapshot`.
    #[inline]
    pub(crate) fn progressed_since(&self, snapshot: ParserSnapshot) -> bool {
        self.state.token_pos != snapshot.state.token_pos
    }
}
