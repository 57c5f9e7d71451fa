//! Parse options.

use crate::{RecoveryConfig, TraceMode};

/// Per-parser switches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub trace: TraceMode,
    /// `Some` turns `many_with_recovery` loops into resynchronizing loops.
    pub error_recovery: Option<RecoveryConfig>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trace(mut self, trace: TraceMode) -> Self {
        self.trace = trace;
        self
    }

    #[must_use]
    pub fn with_error_recovery(mut self, config: RecoveryConfig) -> Self {
        self.error_recovery = Some(config);
        self
    }
}
