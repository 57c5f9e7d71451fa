//! PEG combinators.
//!
//! Each combinator is a no-op returning `false` when the current sequence has
//! already failed, and hands over to the grammar collector in collect mode.

use crate::trace::TraceEvent;
use crate::{Alt, Parser};

impl Parser<'_> {
    /// Ordered choice. The first alternative that succeeds wins; later ones
    /// are never tried, even if they would match more input.
    pub fn or(&mut self, alternatives: &[Alt]) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            self.collect_or(alternatives);
            return true;
        }

        let start = self.snapshot();
        let total = alternatives.len();
        for (branch, alternative) in alternatives.iter().enumerate() {
            self.trace_event(TraceEvent::OrEnter { branch, total });
            alternative(self);
            let success = self.success;
            self.trace_event(TraceEvent::OrExit { branch, success });

            if self.fatal.is_some() {
                self.success = false;
                return false;
            }
            if success {
                return true;
            }
            if self.changed_since(start) {
                self.restore(start);
            }
            self.success = true;
        }
        self.success = false;
        false
    }

    /// Zero or more repetitions. Stops at the first failure (undoing it) or
    /// at the first iteration that consumes nothing.
    pub fn many(&mut self, mut f: impl FnMut(&mut Self)) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            self.collect_many(&mut f);
            return true;
        }

        loop {
            let before = self.snapshot();
            f(self);
            if self.fatal.is_some() {
                self.success = false;
                return false;
            }
            if !self.success {
                self.restore(before);
                self.success = true;
                break;
            }
            if !self.progressed_since(before) {
                break;
            }
        }
        true
    }

    /// Zero or one. Failure and empty success both count as absent.
    pub fn option(&mut self, mut f: impl FnMut(&mut Self)) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            self.collect_option(&mut f);
            return true;
        }

        let before = self.snapshot();
        f(self);
        if self.fatal.is_some() {
            self.success = false;
            return false;
        }
        if !self.success || !self.progressed_since(before) {
            self.restore(before);
            self.success = true;
        }
        true
    }

    /// One or more. The first repetition must succeed.
    pub fn at_least_one(&mut self, mut f: impl FnMut(&mut Self)) -> bool {
        if !self.success {
            return false;
        }
        if self.is_collecting() {
            self.collect_at_least_one(&mut f);
            return true;
        }

        f(self);
        if !self.success {
            return false;
        }
        self.many(f)
    }
}
