//! Token descriptors.
//!
//! A grammar describes its tokens as an ordered list of [`TokenDef`]s built
//! with the constructors and builder methods below:
//!
//! ```text
//! let defs = vec![
//!     TokenDef::pattern("WhiteSpace", r"[ \t]+").skip(),
//!     TokenDef::pattern("Hashbang", r"#![^\n]*").at_file_start(),
//!     TokenDef::keyword("Let", "let"),
//!     TokenDef::pattern("Identifier", r"[A-Za-z_$][\w$]*"),
//!     TokenDef::keyword("OptionalChaining", "?.").reject_if_followed_by("[0-9]"),
//! ];
//! ```
//!
//! Definitions are validated and compiled by `Lexer::new`.

/// Lexical goal: the token category the parser expects next.
///
/// Resolves the two ECMAScript-style ambiguities: a leading `/` (divide or
/// regex literal) and a leading `}` (closing brace or template continuation).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum LexicalGoal {
    /// `/` is a divide punctuator, `}` is a brace.
    #[default]
    Div,
    /// `/` starts a regex literal.
    RegExp,
    /// `/` starts a regex literal, `}` may continue a template.
    RegExpOrTemplateTail,
    /// `}` may continue a template.
    TemplateTail,
}

impl LexicalGoal {
    #[inline]
    pub fn allows_regexp(self) -> bool {
        matches!(self, LexicalGoal::RegExp | LexicalGoal::RegExpOrTemplateTail)
    }

    #[inline]
    pub fn allows_template_tail(self) -> bool {
        matches!(
            self,
            LexicalGoal::TemplateTail | LexicalGoal::RegExpOrTemplateTail
        )
    }
}

/// Role a token plays in goal and template handling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TokenClass {
    #[default]
    Normal,
    /// Regex literal; only active under regex goals, where it is tried first.
    RegExp,
    /// `` `...${ ``; increments the template depth.
    TemplateHead,
    /// `` }...${ ``; only active inside a template under a template goal.
    TemplateMiddle,
    /// `` }...` ``; only active inside a template under a template goal,
    /// decrements the template depth.
    TemplateTail,
    /// `` `...` `` without substitutions.
    NoSubstitutionTemplate,
}

impl TokenClass {
    #[inline]
    pub fn is_template_continuation(self) -> bool {
        matches!(self, TokenClass::TemplateMiddle | TokenClass::TemplateTail)
    }

    /// Whether a token of this class opens a `${ ... }` substitution.
    #[inline]
    pub fn opens_substitution(self) -> bool {
        matches!(self, TokenClass::TemplateHead | TokenClass::TemplateMiddle)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MatcherSpec {
    Pattern(String),
    Keyword(&'static str),
}

/// Where a token may appear, relative to the file, the line and the previous
/// significant token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Constraints {
    pub(crate) file_start: bool,
    pub(crate) line_start: bool,
    pub(crate) only_after: Vec<&'static str>,
    pub(crate) not_after: Vec<&'static str>,
}

impl Constraints {
    pub(crate) fn accepts_previous(&self, last_token: Option<&str>) -> bool {
        if !self.only_after.is_empty() {
            let Some(last) = last_token else {
                return false;
            };
            if !self.only_after.contains(&last) {
                return false;
            }
        }
        match last_token {
            Some(last) => !self.not_after.contains(&last),
            None => true,
        }
    }
}

/// One token descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDef {
    pub(crate) name: &'static str,
    pub(crate) matcher: MatcherSpec,
    pub(crate) skip: bool,
    pub(crate) class: TokenClass,
    pub(crate) constraints: Constraints,
    pub(crate) reject_if_followed_by: Option<String>,
}

impl TokenDef {
    fn new(name: &'static str, matcher: MatcherSpec) -> Self {
        TokenDef {
            name,
            matcher,
            skip: false,
            class: TokenClass::Normal,
            constraints: Constraints::default(),
            reject_if_followed_by: None,
        }
    }

    /// A token matched by a regex, anchored at the current position.
    pub fn pattern(name: &'static str, pattern: impl Into<String>) -> Self {
        Self::new(name, MatcherSpec::Pattern(pattern.into()))
    }

    /// A token matched by exact text.
    pub fn keyword(name: &'static str, text: &'static str) -> Self {
        Self::new(name, MatcherSpec::Keyword(text))
    }

    /// Match but do not emit (whitespace, comments).
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    #[must_use]
    pub fn class(mut self, class: TokenClass) -> Self {
        self.class = class;
        self
    }

    /// Only match at byte 0 (hashbang comments).
    #[must_use]
    pub fn at_file_start(mut self) -> Self {
        self.constraints.file_start = true;
        self
    }

    /// Only match when nothing but whitespace precedes it on its line.
    #[must_use]
    pub fn at_line_start(mut self) -> Self {
        self.constraints.line_start = true;
        self
    }

    /// Only match right after one of the named tokens.
    #[must_use]
    pub fn only_after(mut self, names: &[&'static str]) -> Self {
        self.constraints.only_after.extend_from_slice(names);
        self
    }

    /// Never match right after one of the named tokens.
    #[must_use]
    pub fn not_after(mut self, names: &[&'static str]) -> Self {
        self.constraints.not_after.extend_from_slice(names);
        self
    }

    /// Reject the match when `pattern` matches immediately after it.
    #[must_use]
    pub fn reject_if_followed_by(mut self, pattern: impl Into<String>) -> Self {
        self.reject_if_followed_by = Some(pattern.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_skip(&self) -> bool {
        self.skip
    }

    pub fn token_class(&self) -> TokenClass {
        self.class
    }

    /// The exact text for keyword definitions.
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self.matcher {
            MatcherSpec::Keyword(text) => Some(text),
            MatcherSpec::Pattern(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap for brevity"
)]
