//! Static analysis of Subhuti grammars.
//!
//! The grammar is first collected by running its rule bodies in collect mode
//! ([`subhuti_parse::collect_grammar`]). The [`GrammarAnalyzer`] then expands
//! it into symbol paths and reports, before any input is parsed:
//!
//! - left recursion, which would make the parser loop;
//! - `or` alternatives that can never win because an earlier alternative
//!   matches a prefix of their input;
//! - `or` alternatives that match exactly the same input.
//!
//! ```text
//! let mut analyzer = GrammarAnalyzer::from_rule(&PROGRAM, AnalysisConfig::default())?;
//! let report = analyzer.analyze()?;
//! for finding in &report.findings {
//!     println!("{finding}");
//! }
//! ```

mod analyzer;
mod config;
mod conflicts;
mod error;
mod path;

pub use analyzer::{CacheSizes, GrammarAnalyzer, LeftRecursion};
pub use config::AnalysisConfig;
pub use conflicts::{AnalysisStats, ConflictError, ConflictKind, ValidationReport};
pub use error::{AnalysisError, GrammarValidationError};
pub use path::{Path, PathTrie, Symbol};

use subhuti_parse::Rule;

/// Collect the grammar reachable from `start`, analyze it and apply the
/// strictness of `config`.
pub fn validate_grammar(
    start: &Rule,
    config: AnalysisConfig,
) -> Result<ValidationReport, GrammarValidationError> {
    GrammarAnalyzer::from_rule(start, config)?.validate()
}
