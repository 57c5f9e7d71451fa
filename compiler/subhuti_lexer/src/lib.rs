//! Contextual lexer for Subhuti grammars.
//!
//! Tokens are described at runtime by an ordered list of [`TokenDef`]s (regex
//! pattern or exact keyword text, plus flags and context constraints). The
//! lexer can run eagerly over a whole text ([`Lexer::tokenize`]) or one token
//! at a time under an explicit [`LexicalGoal`] ([`Lexer::read_token_at`]),
//! which is how the parser resolves `/` (divide or regex) and `}` (brace or
//! template continuation).
//!
//! # Match selection
//!
//! 1. Definitions whose class is prioritized by the goal (regex literals under
//!    a regex goal, template continuations under a template goal) are tried
//!    first; the first one that matches wins.
//! 2. Otherwise the longest match wins; ties go to the definition declared
//!    first, so keywords are declared before identifiers.

mod cache;
mod error;
mod lexer;
mod token_def;

pub use cache::{LexCache, LexCacheStats};
pub use error::{LexError, LexerBuildError};
pub use lexer::{LexedToken, Lexer};
pub use token_def::{LexicalGoal, TokenClass, TokenDef};
