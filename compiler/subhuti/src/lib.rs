//! Subhuti: a PEG parsing framework.
//!
//! A language is described by token definitions and rule functions:
//!
//! ```text
//! const EXPR: Rule = Rule::new("Expr", expr);
//!
//! fn expr(p: &mut Parser<'_>) {
//!     p.consume("Number");
//!     p.many(|p| {
//!         p.consume("Plus");
//!         p.consume("Number");
//!     });
//! }
//!
//! let mut subhuti = Subhuti::new(
//!     vec![
//!         TokenDef::pattern("Whitespace", r"\s+").skip(),
//!         TokenDef::pattern("Number", r"[0-9]+"),
//!         TokenDef::keyword("Plus", "+"),
//!     ],
//!     EXPR,
//! )?;
//! let report = subhuti.validate()?;
//! let output = subhuti.parse("1 + 2")?;
//! ```
//!
//! [`Subhuti`] owns the lexer, the parse options and the grammar analyzer; the
//! component crates are re-exported for direct use.

mod config;
mod factory;

use std::sync::Once;

pub use config::{analysis_config_from_env, TIMEOUT_ENV_VAR};
pub use factory::Subhuti;

pub use subhuti_diagnostic::{emitter, Diagnostic, ErrorCode, Severity, Suggestion};
pub use subhuti_grammar::{
    validate_grammar, AnalysisConfig, AnalysisError, AnalysisStats, CacheSizes, ConflictError,
    ConflictKind, GrammarAnalyzer, GrammarValidationError, LeftRecursion, Path, PathTrie,
    ValidationReport,
};
pub use subhuti_ir::{Position, Span, Token};
pub use subhuti_lexer::{LexError, Lexer, LexerBuildError, LexicalGoal, TokenClass, TokenDef};
pub use subhuti_parse::{
    collect_grammar, token_consumer, Alt, CollectError, CstNode, GrammarAst, GrammarNode,
    LoopKind, ParseError, ParseErrorKind, ParseOptions, ParseOutput, ParseStats, Parser,
    ParserSnapshot, RecoveryConfig, Rule, RuleBody, TokenConsumer, TraceMode, ERROR_NODE,
};

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
/// `RUST_LOG=subhuti_parse=trace` shows every rule attempt and consumed token,
/// `RUST_LOG=subhuti_grammar=debug` the analysis phases.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true);
            // Another subscriber may already be installed by the host program.
            let _ = tracing_subscriber::registry()
                .with(tree)
                .with(filter)
                .try_init();
        }
    });
}
