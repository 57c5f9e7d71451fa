use subhuti_ir::{Position, Span, Token};
use subhuti_lexer::TokenDef;

use super::*;

fn lexer() -> Lexer {
    Lexer::new(vec![
        TokenDef::pattern("WhiteSpace", r"\s+").skip(),
        TokenDef::keyword("Function", "function"),
        TokenDef::keyword("Return", "return"),
        TokenDef::keyword("Let", "let"),
        TokenDef::pattern("Identifier", r"[a-z]+"),
        TokenDef::keyword("RParen", ")"),
        TokenDef::keyword("Semicolon", ";"),
    ])
    .unwrap()
}

fn failure(expected: &[&'static str], found: Option<Token>) -> Failure {
    Failure {
        token_pos: 1,
        span: Span::point(Position::new(3, 1, 3)),
        expected: expected.to_vec(),
        found,
        rule_stack: vec!["Program"],
    }
}

fn word(name: &'static str, value: &str) -> Token {
    let start = Position::new(4, 1, 4);
    Token::new(name, value, Span::new(start, start.advance(value)))
}

#[test]
fn distance() {
    assert_eq!(edit_distance("kitten", "sitting"), 3);
    assert_eq!(edit_distance("retrun", "return"), 2);
    assert_eq!(edit_distance("", "abc"), 3);
    assert_eq!(edit_distance("abc", "abc"), 0);
}

#[test]
fn missing_closer_and_semicolon() {
    let lexer = lexer();
    let found = suggestions(&failure(&["RParen", "Semicolon"], None), Some(&lexer));
    let messages: Vec<_> = found.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(messages, ["missing closing `)`", "missing `;`"]);
    let insert = found[0].replacement.as_ref().unwrap();
    assert_eq!(insert.text, ")");
    assert_eq!(insert.span.start.index, 3);
}

#[test]
fn conventional_names_without_lexer() {
    let found = suggestions(&failure(&["RBrace"], None), None);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "missing closing `}`");
}

#[test]
fn keyword_typo() {
    let lexer = lexer();
    let found = suggestions(
        &failure(&["Function", "Return"], Some(word("Identifier", "retrun"))),
        Some(&lexer),
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "did you mean `return`?");
}

#[test]
fn reserved_word_as_identifier() {
    let lexer = lexer();
    let found = suggestions(
        &failure(&["Identifier"], Some(word("Let", "let"))),
        Some(&lexer),
    );
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("`let` is a reserved word"));
}

#[test]
fn nothing_to_suggest() {
    let lexer = lexer();
    let found = suggestions(
        &failure(&["Identifier"], Some(word("Semicolon", ";"))),
        Some(&lexer),
    );
    assert!(found.is_empty());
}
