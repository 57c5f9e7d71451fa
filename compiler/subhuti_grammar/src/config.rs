//! Analyzer configuration.

use std::time::Duration;

/// Bounds for grammar analysis.
///
/// ```text
/// let config = AnalysisConfig::default().with_k(2).strict();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Length of First-K paths.
    pub k: usize,
    /// Deepest BFS level used to confirm a prefix conflict.
    pub max_level: usize,
    /// Wall-clock limit for one analysis run.
    pub timeout: Duration,
    /// Turn error findings into a validation failure.
    pub strict: bool,
    /// Length bound for BFS paths.
    pub bfs_max_len: usize,
    /// Paths kept per BFS level; the rest are dropped.
    pub max_bfs_paths: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            k: 3,
            max_level: 3,
            timeout: Duration::from_secs(10),
            strict: false,
            bfs_max_len: 16,
            max_bfs_paths: 10_000,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }

    #[must_use]
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level.max(1);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn with_bfs_limits(mut self, max_len: usize, max_paths: usize) -> Self {
        self.bfs_max_len = max_len.max(1);
        self.max_bfs_paths = max_paths.max(1);
        self
    }
}
