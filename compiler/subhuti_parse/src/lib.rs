//! Backtracking packrat parser for Subhuti grammars.
//!
//! A grammar is a set of [`Rule`] constants whose bodies call the parser's
//! combinators:
//!
//! ```text
//! const EXPR: Rule = Rule::new("Expr", expr);
//!
//! fn expr(p: &mut Parser<'_>) {
//!     p.subrule(&TERM);
//!     p.many(|p| {
//!         p.consume("Plus");
//!         p.subrule(&TERM);
//!     });
//! }
//! ```
//!
//! # Execution model
//!
//! - Failure is soft: a failed `consume` clears the parser's success flag and
//!   every later call in the sequence becomes a no-op, so a rule body is a
//!   plain list of statements.
//! - Every rule outcome is memoized under (rule name, code index), which bounds
//!   the work of a parse by rules × positions.
//! - Re-entering a rule at the same position while it is still running is a
//!   grammar defect (left recursion or a shadowed alternative) and aborts the
//!   parse.
//! - The same bodies run in collect mode to produce a [`GrammarAst`] for
//!   static analysis.

mod collect;
mod consumer;
mod cst;
mod error;
mod options;
mod packrat;
mod parser;
mod recovery;
mod rule;
mod trace;

pub use collect::{collect_grammar, CollectError, GrammarAst, GrammarNode};
pub use consumer::TokenConsumer;
pub use cst::{CstNode, ERROR_NODE};
pub use error::{LoopKind, ParseError, ParseErrorKind};
pub use options::ParseOptions;
pub use packrat::ParseStats;
pub use parser::{ParseOutput, Parser, ParserSnapshot};
pub use recovery::RecoveryConfig;
pub use rule::{Alt, Rule, RuleBody};
pub use subhuti_lexer::LexicalGoal;
pub use trace::{TraceEvent, TraceMode, TraceRecorder};
