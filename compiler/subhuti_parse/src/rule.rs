//! Grammar rules.

use std::fmt;

use crate::Parser;

/// Body of a rule or of one `or` alternative.
///
/// Bodies report failure through the parser's success flag rather than a
/// return value, so a sequence is written as plain statements:
///
/// ```text
/// const STATEMENT: Rule = Rule::new("Statement", statement);
///
/// fn statement(p: &mut Parser<'_>) {
///     p.subrule(&EXPRESSION);
///     p.consume("Semicolon");
/// }
/// ```
pub type RuleBody = fn(&mut Parser<'_>);

/// One alternative of [`Parser::or`].
pub type Alt = fn(&mut Parser<'_>);

/// A named grammar rule.
///
/// Rules are plain constants; the name keys the packrat cache, loop detection,
/// the CST node and the collected grammar.
#[derive(Copy, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub body: RuleBody,
}

impl Rule {
    pub const fn new(name: &'static str, body: RuleBody) -> Self {
        Rule { name, body }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Rule {}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({})", self.name)
    }
}
