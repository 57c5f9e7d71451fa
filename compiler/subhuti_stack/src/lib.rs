//! Stack growth for recursive rule execution.
//!
//! Rule bodies call subrules, which call rule bodies: a deeply nested input
//! (`((((...))))`) or a deeply nested grammar turns into native recursion in the
//! parser, in the grammar collector and in the path analyzer. Every one of those
//! recursion points goes through [`with_stack`] so that the stack is grown on
//! demand instead of overflowing.
//!
//! On `wasm32` the guard is a plain call.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if the remaining space is below the red zone.
///
/// ```text
/// fn subrule(&mut self, rule: &Rule) -> bool {
///     with_stack(|| self.execute_rule(rule))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack in bytes, when the platform can tell.
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining() -> Option<usize> {
    stacker::remaining_stack()
}

#[cfg(target_arch = "wasm32")]
pub fn remaining() -> Option<usize> {
    None
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
