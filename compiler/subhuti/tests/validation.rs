//! Grammar validation through the facade: grammars are written as rule
//! functions and collected before analysis.

use pretty_assertions::assert_eq;
use subhuti::{
    AnalysisConfig, ConflictKind, GrammarValidationError, LoopKind, ParseErrorKind, Parser, Rule,
    Severity, Subhuti, TokenDef,
};

fn tokens() -> Vec<TokenDef> {
    vec![
        TokenDef::pattern("WhiteSpace", r"\s+").skip(),
        TokenDef::pattern("Number", r"[0-9]+"),
        TokenDef::keyword("Plus", "+"),
        TokenDef::keyword("LParen", "("),
        TokenDef::keyword("RParen", ")"),
        TokenDef::keyword("A", "a"),
        TokenDef::keyword("B", "b"),
    ]
}

fn subhuti(start: Rule) -> Subhuti {
    Subhuti::new(tokens(), start)
        .unwrap()
        .with_analysis_config(AnalysisConfig::default())
}

// === Left recursion ===

// Expr -> Expr Plus Term | Term
const LEFT_EXPR: Rule = Rule::new("Expr", left_expr);
const NUMBER_TERM: Rule = Rule::new("Term", number_term);

fn left_expr(p: &mut Parser<'_>) {
    p.or(&[left_recursive_alt, left_base_alt]);
}

fn left_recursive_alt(p: &mut Parser<'_>) {
    p.subrule(&LEFT_EXPR);
    p.consume("Plus");
    p.subrule(&NUMBER_TERM);
}

fn left_base_alt(p: &mut Parser<'_>) {
    p.subrule(&NUMBER_TERM);
}

fn number_term(p: &mut Parser<'_>) {
    p.consume("Number");
}

#[test]
fn left_recursion_is_fatal_and_comes_with_a_rewrite() {
    let mut s = subhuti(LEFT_EXPR);
    let report = s.validate().unwrap();
    assert_eq!(report.findings.len(), 1);

    let finding = &report.findings[0];
    assert_eq!(finding.severity, Severity::Fatal);
    assert_eq!(finding.kind, ConflictKind::LeftRecursion);
    assert_eq!(finding.rule, "Expr");
    assert_eq!(
        finding.suggestion.as_deref(),
        Some("Expr -> Term (Plus Term)*")
    );
}

#[test]
fn left_recursion_also_stops_a_parse() {
    let s = subhuti(LEFT_EXPR);
    let err = s.parse("1 + 2").unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::Loop {
            kind: LoopKind::LeftRecursion,
            ..
        }
    ));
}

// Expr -> Term (Plus Term)*
// Term -> Number | LParen Expr RParen
const EXPR: Rule = Rule::new("Expr", expr);
const TERM: Rule = Rule::new("Term", term);

fn expr(p: &mut Parser<'_>) {
    p.subrule(&TERM);
    p.many(|p| {
        p.consume("Plus");
        p.subrule(&TERM);
    });
}

fn term(p: &mut Parser<'_>) {
    p.or(&[number, parenthesized]);
}

fn number(p: &mut Parser<'_>) {
    p.consume("Number");
}

fn parenthesized(p: &mut Parser<'_>) {
    p.consume("LParen");
    p.subrule(&EXPR);
    p.consume("RParen");
}

#[test]
fn rewritten_grammar_is_clean() {
    let mut s = subhuti(EXPR);
    let report = s.validate().unwrap();
    assert!(report.is_clean(), "{report}");
    assert_eq!(report.stats.rules, 2);
    assert_eq!(report.stats.or_nodes, 1);

    let out = s.parse("(1 + 2) + 3").unwrap();
    assert_eq!(out.cst.name, "Expr");
    assert_eq!(out.cst.tokens().len(), 7);
}

#[test]
fn collected_grammar_renders_as_ebnf() {
    let mut s = subhuti(EXPR);
    let analyzer = s.analyzer().unwrap();
    assert_eq!(
        analyzer.grammar().to_string(),
        "Expr -> Term (Plus Term)*\nTerm -> Number | LParen Expr RParen\n"
    );
}

// === Or shadowing ===

const SHORT_FIRST: Rule = Rule::new("S", short_first);
const LONG_FIRST: Rule = Rule::new("S", long_first);
const TWICE: Rule = Rule::new("S", twice);

fn short_first(p: &mut Parser<'_>) {
    p.or(&[a, a_b]);
}

fn long_first(p: &mut Parser<'_>) {
    p.or(&[a_b, a]);
}

fn twice(p: &mut Parser<'_>) {
    p.or(&[a, a]);
}

fn a(p: &mut Parser<'_>) {
    p.consume("A");
}

fn a_b(p: &mut Parser<'_>) {
    p.consume("A");
    p.consume("B");
}

#[test]
fn shorter_prefix_first_is_an_error() {
    let mut s = subhuti(SHORT_FIRST);
    let report = s.validate().unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, Severity::Error);
    assert_eq!(report.findings[0].kind, ConflictKind::PrefixConflict);
    assert_eq!(report.findings[0].branches, Some((0, 1)));

    // The second alternative is dead: `a b` stops after `a`.
    let err = s.parse("a b").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnconsumedInput);
}

#[test]
fn longest_first_is_only_a_warning() {
    let mut s = subhuti(LONG_FIRST);
    let report = s.validate().unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].severity, Severity::Warning);
    assert_eq!(report.findings[0].kind, ConflictKind::PrefixConflict);
    assert_eq!(report.findings[0].branches, Some((1, 0)));

    assert!(s.parse("a").is_ok());
    assert!(s.parse("a b").is_ok());
}

#[test]
fn identical_branches() {
    let mut s = subhuti(TWICE);
    let report = s.validate().unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, ConflictKind::IdenticalBranches);
    assert_eq!(report.findings[0].branches, Some((0, 1)));
}

#[test]
fn strict_mode_rejects_the_grammar() {
    let mut s = subhuti(TWICE);
    s.set_analysis_config(AnalysisConfig::default().strict());
    let err = s.validate().unwrap_err();
    assert!(matches!(err, GrammarValidationError::Conflicts { .. }));
    assert_eq!(err.to_diagnostics()[0].code.as_str(), "E2003");
}

#[test]
fn analysis_caches_live_on_the_factory() {
    let mut s = subhuti(EXPR);
    s.validate().unwrap();
    let sizes = s.analyzer().unwrap().cache_sizes();
    assert_eq!(sizes.dfs_first_k, 2);

    s.invalidate_analysis();
    assert_eq!(s.analyzer().unwrap().cache_sizes().dfs_first_k, 0);
}

// === Name clash ===

const CLASH: Rule = Rule::new("Number", clash);

fn clash(p: &mut Parser<'_>) {
    p.consume("Number");
}

#[test]
fn rule_and_token_names_must_differ() {
    let err = subhuti(CLASH).validate().unwrap_err();
    assert!(matches!(err, GrammarValidationError::Collect(_)));
    assert_eq!(err.to_diagnostics()[0].code.as_str(), "E2005");
}
