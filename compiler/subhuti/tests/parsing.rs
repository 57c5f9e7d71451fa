//! Parsing through the facade: on-demand lexing, recovery, tracing and the
//! packrat bound.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use subhuti::{LexicalGoal, ParseErrorKind, Parser, Rule, Subhuti, TokenClass, TokenDef, ERROR_NODE};

// === Statements with recovery ===

// Program   -> Statement*
// Statement -> Let Identifier Assign Expr Semicolon
// Expr      -> Identifier | Number
const PROGRAM: Rule = Rule::new("Program", program);
const STATEMENT: Rule = Rule::new("Statement", statement);
const EXPR: Rule = Rule::new("Expr", expr);

fn program(p: &mut Parser<'_>) {
    p.many_with_recovery(|p| {
        p.subrule(&STATEMENT);
    });
}

fn statement(p: &mut Parser<'_>) {
    p.consume("Let");
    p.consume("Identifier");
    p.consume("Assign");
    p.subrule(&EXPR);
    p.consume("Semicolon");
}

fn expr(p: &mut Parser<'_>) {
    p.or(&[identifier, number]);
}

fn identifier(p: &mut Parser<'_>) {
    p.consume("Identifier");
}

fn number(p: &mut Parser<'_>) {
    p.consume("Number");
}

fn statements() -> Subhuti {
    Subhuti::new(
        vec![
            TokenDef::pattern("WhiteSpace", r"\s+").skip(),
            TokenDef::keyword("Let", "let"),
            TokenDef::pattern("Identifier", r"[a-z]+"),
            TokenDef::pattern("Number", r"[0-9]+"),
            TokenDef::keyword("Assign", "="),
            TokenDef::keyword("Semicolon", ";"),
        ],
        PROGRAM,
    )
    .unwrap()
}

const THREE_STATEMENTS: &str = "let a = 1;\nlet b = ;\nlet c = 3;";

#[test]
fn recovery_keeps_the_statements_around_an_error() {
    let mut s = statements();
    s.enable_error_recovery();
    let out = s.parse(THREE_STATEMENTS).unwrap();

    let names: Vec<_> = out
        .cst
        .children()
        .unwrap_or_default()
        .iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Statement", ERROR_NODE, "Statement"]);
    assert!(out.has_errors());

    assert_eq!(out.errors.len(), 1);
    let error = &out.errors[0];
    assert_eq!(error.kind, ParseErrorKind::Recovered { skipped: 4 });
    assert_eq!(error.span.start.line, 2);
    assert_eq!(error.expected, ["Identifier", "Number"]);
}

#[test]
fn without_recovery_the_same_input_fails() {
    let err = statements().parse(THREE_STATEMENTS).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.span.start.line, 2);
    assert_eq!(err.to_diagnostic().code.as_str(), "E1001");
}

#[test]
fn syntax_errors_carry_the_rule_path_and_a_snippet() {
    let err = statements().parse(THREE_STATEMENTS).unwrap_err();
    assert_eq!(
        err.to_string(),
        "expected Identifier or Number, found Semicolon `;` at 2:9\n  while parsing Program > Statement > Expr"
    );

    let report = err.render(THREE_STATEMENTS);
    assert!(
        report.starts_with("error[E1001]: expected Identifier or Number, found Semicolon `;`\n"),
        "{report}"
    );
    assert!(report.contains("\n 2 | let b = ;\n"), "{report}");
    assert!(report.contains("= note: while parsing Program > Statement > Expr"), "{report}");
}

#[test]
fn recovery_leaves_valid_input_untouched() {
    let mut s = statements();
    s.enable_error_recovery();
    let out = s.parse("let a = 1; let b = c;").unwrap();
    assert!(!out.has_errors());
    assert!(out.errors.is_empty());
    assert_eq!(out.cst.children().map(<[_]>::len), Some(2));
}

// === Lexical goals ===

subhuti::token_consumer! {
    struct AssignTokens {
        identifier => "Identifier",
        assign => "Assign",
        slash => "Slash",
        regex => "RegularExpression" @ LexicalGoal::RegExp,
    }
}

// Assignment -> Identifier Assign (RegularExpression | Identifier Slash Identifier)
const ASSIGNMENT: Rule = Rule::new("Assignment", assignment);

fn assignment(p: &mut Parser<'_>) {
    let mut t = p.tokens::<AssignTokens>();
    t.identifier();
    t.assign();
    p.or(&[regex_literal, division]);
}

fn regex_literal(p: &mut Parser<'_>) {
    p.tokens::<AssignTokens>().regex();
}

fn division(p: &mut Parser<'_>) {
    let mut t = p.tokens::<AssignTokens>();
    t.identifier();
    t.slash();
    t.identifier();
}

fn assignments() -> Subhuti {
    Subhuti::new(
        vec![
            TokenDef::pattern("WhiteSpace", r"\s+").skip(),
            TokenDef::pattern("Identifier", r"[a-z]+"),
            TokenDef::keyword("Assign", "="),
            TokenDef::pattern("RegularExpression", r"/(?:[^/\\\n]|\\.)+/[a-z]*")
                .class(TokenClass::RegExp),
            TokenDef::keyword("Slash", "/"),
        ],
        ASSIGNMENT,
    )
    .unwrap()
}

fn leaves(s: &Subhuti, text: &str) -> Vec<&'static str> {
    let out = s.parse(text).unwrap();
    out.cst.tokens().iter().map(|n| n.name).collect()
}

#[test]
fn slash_is_division_or_regex_by_goal() {
    let s = assignments();
    assert_eq!(
        leaves(&s, "x = a / b"),
        ["Identifier", "Assign", "Identifier", "Slash", "Identifier"]
    );
    assert_eq!(
        leaves(&s, "x = /ab+c/"),
        ["Identifier", "Assign", "RegularExpression"]
    );
}

#[test]
fn eager_tokenizing_agrees_with_on_demand_lexing() {
    let s = assignments();
    for text in ["x = a / b", "x = /ab+c/"] {
        let tokens = s.tokenize(text).unwrap();
        let from_tokens = s.parse_tokens(&tokens).unwrap();
        let from_source = s.parse(text).unwrap();
        assert_eq!(from_tokens.cst, from_source.cst);
    }
}

// === Tracing ===

#[test]
fn debug_mode_records_a_trace() {
    let mut s = assignments();
    assert_eq!(s.parse("x = a / b").unwrap().trace, None);

    s.debug(false);
    let trace = s.parse("x = a / b").unwrap().trace.unwrap();
    assert!(trace.starts_with("Assignment ✓\n"), "{trace}");
}

#[test]
fn failed_parse_keeps_its_trace() {
    let mut s = assignments();
    assert_eq!(s.parse("x = a /").unwrap_err().trace, None);

    s.debug(false);
    let err = s.parse("x = a /").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    let trace = err.trace.unwrap();
    assert!(trace.starts_with("Assignment ✗\n"), "{trace}");
    assert!(trace.contains("#2/2 ✗"), "{trace}");
}

#[test]
fn init_tracing_can_be_called_twice() {
    subhuti::init_tracing();
    subhuti::init_tracing();
}

// === Determinism and the packrat bound ===

// Sum  -> Atom (Plus Atom)*
// Atom -> Number | LParen Sum RParen
const SUM: Rule = Rule::new("Sum", sum);
const ATOM: Rule = Rule::new("Atom", atom);

fn sum(p: &mut Parser<'_>) {
    p.subrule(&ATOM);
    p.many(|p| {
        p.consume("Plus");
        p.subrule(&ATOM);
    });
}

fn atom(p: &mut Parser<'_>) {
    p.or(&[atom_number, atom_group]);
}

fn atom_number(p: &mut Parser<'_>) {
    p.consume("Number");
}

fn atom_group(p: &mut Parser<'_>) {
    p.consume("LParen");
    p.subrule(&SUM);
    p.consume("RParen");
}

fn sums() -> Subhuti {
    Subhuti::new(
        vec![
            TokenDef::pattern("WhiteSpace", r"\s+").skip(),
            TokenDef::pattern("Number", r"[0-9]+"),
            TokenDef::keyword("Plus", "+"),
            TokenDef::keyword("LParen", "("),
            TokenDef::keyword("RParen", ")"),
        ],
        SUM,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn parses_are_deterministic_and_packrat_bounded(kinds in prop::collection::vec(0u8..4, 0..20)) {
        let text: Vec<&str> = kinds
            .iter()
            .map(|k| match k {
                0 => "1",
                1 => "+",
                2 => "(",
                _ => ")",
            })
            .collect();
        let text = text.join(" ");
        let s = sums();

        let first = s.parse(&text);
        let second = s.parse(&text);
        prop_assert_eq!(&first, &second);

        if let Ok(out) = first {
            let tokens = s.tokenize(&text).unwrap();
            // Two rules, one packrat slot each per position.
            prop_assert!(out.stats.rule_computations <= 2 * (tokens.len() + 1));
        }
    }
}
