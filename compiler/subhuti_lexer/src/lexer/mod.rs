//! The lexer proper.

use std::fmt;

use regex::Regex;
use subhuti_ir::{is_line_terminator, Position, Span, Token};
use tracing::{debug, trace};

use crate::token_def::{Constraints, MatcherSpec};
use crate::{LexError, LexerBuildError, LexicalGoal, TokenClass, TokenDef};

/// Result of reading one token on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexedToken {
    pub token: Token,
    /// Position right after the token (trivia after it is not skipped yet).
    pub next: Position,
    /// Template depth after the token.
    pub template_depth: u32,
    /// Class of the definition that produced the token.
    pub class: TokenClass,
}

enum Matcher {
    Regex(Regex),
    Keyword(&'static str),
}

struct CompiledDef {
    name: &'static str,
    matcher: Matcher,
    skip: bool,
    class: TokenClass,
    constraints: Constraints,
    reject_if_followed_by: Option<Regex>,
}

fn anchored(name: &'static str, pattern: &str) -> Result<Regex, LexerBuildError> {
    Regex::new(&format!("^(?:{pattern})"))
        .map_err(|source| LexerBuildError::InvalidPattern { name, source })
}

/// Checks whether only horizontal whitespace separates `index` from the
/// previous line terminator (or the start of the text).
fn at_line_start(source: &str, index: usize) -> bool {
    source[..index]
        .chars()
        .rev()
        .take_while(|c| !is_line_terminator(*c))
        .all(char::is_whitespace)
}

impl CompiledDef {
    fn is_active(&self, goal: LexicalGoal, template_depth: u32) -> bool {
        match self.class {
            TokenClass::RegExp => goal.allows_regexp(),
            TokenClass::TemplateMiddle | TokenClass::TemplateTail => {
                goal.allows_template_tail() && template_depth > 0
            }
            _ => true,
        }
    }

    fn is_prioritized(&self, goal: LexicalGoal) -> bool {
        match self.class {
            TokenClass::RegExp => goal.allows_regexp(),
            TokenClass::TemplateMiddle | TokenClass::TemplateTail => goal.allows_template_tail(),
            _ => false,
        }
    }

    /// Length of the match at `index`, after context constraints.
    fn match_len(&self, source: &str, index: usize, last_token: Option<&str>) -> Option<usize> {
        if self.constraints.file_start && index != 0 {
            return None;
        }
        if self.constraints.line_start && !at_line_start(source, index) {
            return None;
        }
        if !self.skip && !self.constraints.accepts_previous(last_token) {
            return None;
        }

        let rest = &source[index..];
        let len = match &self.matcher {
            Matcher::Keyword(text) => rest.starts_with(*text).then_some(text.len())?,
            Matcher::Regex(re) => re.find(rest).map(|m| m.end())?,
        };
        // Zero-width tokens would stall the lexer.
        if len == 0 {
            return None;
        }
        if let Some(reject) = &self.reject_if_followed_by {
            if reject.is_match(&rest[len..]) {
                return None;
            }
        }
        Some(len)
    }
}

/// Lexer compiled from an ordered list of token definitions.
pub struct Lexer {
    defs: Vec<CompiledDef>,
}

impl fmt::Debug for Lexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("tokens", &self.defs.iter().map(|d| d.name).collect::<Vec<_>>())
            .finish()
    }
}

impl Lexer {
    pub fn new(defs: Vec<TokenDef>) -> Result<Self, LexerBuildError> {
        let defs = defs
            .into_iter()
            .map(|def| {
                if def.name.is_empty() {
                    return Err(LexerBuildError::EmptyName);
                }
                let matcher = match def.matcher {
                    MatcherSpec::Keyword("") => {
                        return Err(LexerBuildError::EmptyKeyword { name: def.name })
                    }
                    MatcherSpec::Keyword(text) => Matcher::Keyword(text),
                    MatcherSpec::Pattern(pattern) => Matcher::Regex(anchored(def.name, &pattern)?),
                };
                let reject_if_followed_by = def
                    .reject_if_followed_by
                    .as_deref()
                    .map(|pattern| anchored(def.name, pattern))
                    .transpose()?;
                Ok(CompiledDef {
                    name: def.name,
                    matcher,
                    skip: def.skip,
                    class: def.class,
                    constraints: def.constraints,
                    reject_if_followed_by,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = defs.len(), "lexer compiled");
        Ok(Lexer { defs })
    }

    /// Names of all emitted (non-skip) tokens, in declaration order.
    pub fn token_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.iter().filter(|d| !d.skip).map(|d| d.name)
    }

    pub fn has_token(&self, name: &str) -> bool {
        self.defs.iter().any(|d| d.name == name)
    }

    /// Exact text of a keyword token.
    pub fn keyword_text(&self, name: &str) -> Option<&'static str> {
        self.defs.iter().find_map(|d| match d.matcher {
            Matcher::Keyword(text) if d.name == name => Some(text),
            _ => None,
        })
    }

    /// Keyword definitions whose text is a word (reserved words).
    pub fn reserved_words(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defs.iter().filter_map(|d| match d.matcher {
            Matcher::Keyword(text) if text.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                Some((d.name, text))
            }
            _ => None,
        })
    }

    /// Whether `name` is a reserved-word keyword token.
    pub fn is_reserved_word(&self, name: &str) -> bool {
        self.reserved_words().any(|(n, _)| n == name)
    }

    /// Pick the definition matching at `index`.
    fn select(
        &self,
        source: &str,
        index: usize,
        goal: LexicalGoal,
        last_token: Option<&str>,
        template_depth: u32,
    ) -> Option<(&CompiledDef, usize)> {
        let active = self
            .defs
            .iter()
            .filter(|d| d.is_active(goal, template_depth));

        let mut best: Option<(&CompiledDef, usize)> = None;
        for def in active {
            let Some(len) = def.match_len(source, index, last_token) else {
                continue;
            };
            if def.is_prioritized(goal) {
                return Some((def, len));
            }
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((def, len));
            }
        }
        best
    }

    /// Read the next significant token starting at `start`.
    ///
    /// Skip tokens are consumed on the way. Returns `Ok(None)` at end of
    /// input and an error when no definition matches.
    pub fn read_token_at(
        &self,
        source: &str,
        start: Position,
        goal: LexicalGoal,
        last_token: Option<&'static str>,
        template_depth: u32,
    ) -> Result<Option<LexedToken>, LexError> {
        let mut pos = start;
        let mut line_break = false;
        loop {
            if pos.index >= source.len() {
                return Ok(None);
            }
            let Some((def, len)) = self.select(source, pos.index, goal, last_token, template_depth)
            else {
                let ch = source[pos.index..].chars().next().unwrap_or('\0');
                return Err(LexError::UnexpectedCharacter { ch, position: pos });
            };
            let text = &source[pos.index..pos.index + len];
            let end = pos.advance(text);
            if def.skip {
                line_break |= text.chars().any(is_line_terminator);
                pos = end;
                continue;
            }

            let template_depth = match def.class {
                TokenClass::TemplateHead => template_depth + 1,
                TokenClass::TemplateTail => template_depth.saturating_sub(1),
                _ => template_depth,
            };
            trace!(name = def.name, index = pos.index, ?goal, "token");
            let token = Token::new(def.name, text, Span::new(pos, end))
                .with_line_break_before(line_break);
            return Ok(Some(LexedToken {
                token,
                next: end,
                template_depth,
                class: def.class,
            }));
        }
    }

    /// Tokenize a whole text.
    ///
    /// The goal for each token is picked from context: a template goal while
    /// inside a `${ ... }` substitution whose braces are balanced, a regex goal
    /// where the previous token cannot end an expression.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError> {
        #[derive(Copy, Clone, PartialEq)]
        enum Open {
            Brace,
            Substitution,
        }

        let mut tokens: Vec<Token> = Vec::new();
        let mut opens: Vec<Open> = Vec::new();
        let mut pos = Position::START;
        let mut depth = 0;
        let mut last_class = TokenClass::Normal;

        loop {
            let regex_ok = tokens
                .last()
                .map_or(true, |t| regex_allowed_after(&t.value, last_class));
            let in_substitution = opens.last() == Some(&Open::Substitution);
            let goal = match (regex_ok, in_substitution) {
                (true, true) => LexicalGoal::RegExpOrTemplateTail,
                (true, false) => LexicalGoal::RegExp,
                (false, true) => LexicalGoal::TemplateTail,
                (false, false) => LexicalGoal::Div,
            };
            let last = tokens.last().map(|t| t.name);
            let Some(lexed) = self.read_token_at(source, pos, goal, last, depth)? else {
                break;
            };

            match lexed.class {
                TokenClass::TemplateHead => opens.push(Open::Substitution),
                TokenClass::TemplateTail => {
                    opens.pop();
                }
                TokenClass::TemplateMiddle => {}
                _ => match lexed.token.value.as_str() {
                    "{" => opens.push(Open::Brace),
                    "}" if opens.last() == Some(&Open::Brace) => {
                        opens.pop();
                    }
                    _ => {}
                },
            }
            pos = lexed.next;
            depth = lexed.template_depth;
            last_class = lexed.class;
            tokens.push(lexed.token);
        }
        debug!(count = tokens.len(), "tokenized");
        Ok(tokens)
    }
}

/// Words after which a `/` starts a regex literal rather than a division.
const REGEX_PRECEDING_WORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Whether a `/` after a token with this text starts a regex literal.
fn regex_allowed_after(value: &str, class: TokenClass) -> bool {
    // Literals end an expression.
    if matches!(
        class,
        TokenClass::RegExp | TokenClass::TemplateTail | TokenClass::NoSubstitutionTemplate
    ) {
        return false;
    }
    let Some(first) = value.chars().next() else {
        return true;
    };
    if first.is_alphabetic() || first == '_' || first == '$' {
        return REGEX_PRECEDING_WORDS.contains(&value);
    }
    if first.is_ascii_digit() || matches!(first, '"' | '\'') {
        return false;
    }
    !matches!(value, ")" | "]" | "}")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
mod tests;
