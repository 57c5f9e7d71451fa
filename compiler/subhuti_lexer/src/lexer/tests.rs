use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

/// A small ECMAScript-flavored token set.
fn js() -> Lexer {
    Lexer::new(vec![
        TokenDef::pattern("LineTerminator", r"\r\n|[\n\r\x{2028}\x{2029}]").skip(),
        TokenDef::pattern("WhiteSpace", r"[ \t]+").skip(),
        TokenDef::pattern("Comment", r"//[^\n\r\x{2028}\x{2029}]*").skip(),
        TokenDef::pattern("HtmlCloseComment", r"-->[^\n]*")
            .at_line_start()
            .skip(),
        TokenDef::pattern("Hashbang", r"#![^\n]*").at_file_start(),
        TokenDef::keyword("Let", "let"),
        TokenDef::keyword("Return", "return"),
        TokenDef::keyword("Of", "of").not_after(&["Dot"]),
        TokenDef::pattern("Identifier", r"[A-Za-z_$][\w$]*"),
        TokenDef::pattern("Number", r"[0-9]+(?:\.[0-9]*)?|\.[0-9]+"),
        TokenDef::keyword("OptionalChaining", "?.").reject_if_followed_by("[0-9]"),
        TokenDef::keyword("Question", "?"),
        TokenDef::keyword("Dot", "."),
        TokenDef::keyword("Decrement", "--"),
        TokenDef::keyword("Minus", "-"),
        TokenDef::keyword("Greater", ">"),
        TokenDef::keyword("Plus", "+"),
        TokenDef::keyword("SlashAssign", "/="),
        TokenDef::keyword("Slash", "/"),
        TokenDef::keyword("Assign", "="),
        TokenDef::keyword("Colon", ":"),
        TokenDef::keyword("Semicolon", ";"),
        TokenDef::keyword("LParen", "("),
        TokenDef::keyword("RParen", ")"),
        TokenDef::keyword("LBrace", "{"),
        TokenDef::keyword("RBrace", "}"),
        TokenDef::pattern("RegularExpression", r"/(?:[^/\\\n]|\\.)+/[a-z]*")
            .class(TokenClass::RegExp),
        TokenDef::pattern("NoSubstitutionTemplate", r"`[^`$]*`")
            .class(TokenClass::NoSubstitutionTemplate),
        TokenDef::pattern("TemplateHead", r"`[^`$]*\$\{").class(TokenClass::TemplateHead),
        TokenDef::pattern("TemplateMiddle", r"\}[^`$]*\$\{").class(TokenClass::TemplateMiddle),
        TokenDef::pattern("TemplateTail", r"\}[^`$]*`").class(TokenClass::TemplateTail),
    ])
    .unwrap()
}

fn names(src: &str) -> Vec<&'static str> {
    js().tokenize(src)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect()
}

// === Goals ===

#[test]
fn slash_after_operand_is_divide() {
    assert_eq!(names("a / b"), ["Identifier", "Slash", "Identifier"]);
    assert_eq!(
        names("a / b / c"),
        ["Identifier", "Slash", "Identifier", "Slash", "Identifier"]
    );
}

#[test]
fn slash_after_operator_is_regex() {
    let tokens = js().tokenize("x = /ab+c/g").unwrap();
    assert_eq!(tokens[2].name, "RegularExpression");
    assert_eq!(tokens[2].value, "/ab+c/g");
    assert_eq!(names("return /a/"), ["Return", "RegularExpression"]);
}

#[test]
fn regex_literal_ends_an_expression() {
    assert_eq!(
        names("x = /a/ / 2"),
        ["Identifier", "Assign", "RegularExpression", "Slash", "Number"]
    );
}

#[test]
fn read_token_at_honours_goal() {
    let lexer = js();
    let src = "/ab+c/";

    let div = lexer
        .read_token_at(src, Position::START, LexicalGoal::Div, None, 0)
        .unwrap()
        .unwrap();
    assert_eq!(div.token.name, "Slash");
    assert_eq!(div.next.index, 1);

    let re = lexer
        .read_token_at(src, Position::START, LexicalGoal::RegExp, None, 0)
        .unwrap()
        .unwrap();
    assert_eq!(re.token.name, "RegularExpression");
    assert_eq!(re.token.value, "/ab+c/");
    assert_eq!(re.class, TokenClass::RegExp);
}

// === Match selection ===

#[test]
fn longest_match_then_declaration_order() {
    let tokens = js().tokenize("let letter").unwrap();
    assert_eq!(tokens[0].name, "Let");
    assert_eq!(tokens[1].name, "Identifier");
    assert_eq!(tokens[1].value, "letter");
    assert_eq!(names("a /= b"), ["Identifier", "SlashAssign", "Identifier"]);
}

#[test]
fn zero_width_matches_are_rejected() {
    let lexer = Lexer::new(vec![TokenDef::pattern("Digits", "[0-9]*")]).unwrap();
    let err = lexer.tokenize("a").unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedCharacter {
            ch: 'a',
            position: Position::START
        }
    );
}

// === Templates ===

#[test]
fn template_with_substitutions() {
    let lexer = js();
    let tokens = lexer.tokenize("`a${x}b${y}c`").unwrap();
    let got: Vec<_> = tokens.iter().map(|t| (t.name, t.value.as_str())).collect();
    assert_eq!(
        got,
        [
            ("TemplateHead", "`a${"),
            ("Identifier", "x"),
            ("TemplateMiddle", "}b${"),
            ("Identifier", "y"),
            ("TemplateTail", "}c`"),
        ]
    );
}

#[test]
fn braces_inside_substitution() {
    assert_eq!(
        names("`${ {a} }`"),
        ["TemplateHead", "LBrace", "Identifier", "RBrace", "TemplateTail"]
    );
}

#[test]
fn template_depth_gates_continuations() {
    let lexer = js();
    let src = "}x`";

    let outside = lexer
        .read_token_at(src, Position::START, LexicalGoal::TemplateTail, None, 0)
        .unwrap()
        .unwrap();
    assert_eq!(outside.token.name, "RBrace");

    let inside = lexer
        .read_token_at(src, Position::START, LexicalGoal::TemplateTail, None, 1)
        .unwrap()
        .unwrap();
    assert_eq!(inside.token.name, "TemplateTail");
    assert_eq!(inside.template_depth, 0);

    let head = lexer
        .read_token_at("`a${", Position::START, LexicalGoal::Div, None, 0)
        .unwrap()
        .unwrap();
    assert_eq!(head.template_depth, 1);
}

#[test]
fn plain_template() {
    assert_eq!(names("`abc` / 2"), ["NoSubstitutionTemplate", "Slash", "Number"]);
}

// === Context constraints ===

#[test]
fn hashbang_only_at_file_start() {
    let tokens = js().tokenize("#!/usr/bin/env node\nx").unwrap();
    assert_eq!(tokens[0].name, "Hashbang");
    assert_eq!(tokens[1].name, "Identifier");
    assert!(tokens[1].has_line_break_before);

    let err = js().tokenize("x #!y").unwrap_err();
    assert_eq!(err.position(), Position::new(2, 1, 2));
}

#[test]
fn html_close_comment_only_at_line_start() {
    assert_eq!(names("a\n  --> note\nb"), ["Identifier", "Identifier"]);
    assert_eq!(
        names("a --> b"),
        ["Identifier", "Decrement", "Greater", "Identifier"]
    );
}

#[test]
fn optional_chaining_not_before_digit() {
    assert_eq!(
        names("a?.b"),
        ["Identifier", "OptionalChaining", "Identifier"]
    );
    assert_eq!(
        names("a?.5:1"),
        ["Identifier", "Question", "Number", "Colon", "Number"]
    );
}

#[test]
fn previous_token_constraints() {
    let tokens = js().tokenize("x.of of").unwrap();
    let got: Vec<_> = tokens.iter().map(|t| t.name).collect();
    assert_eq!(got, ["Identifier", "Dot", "Identifier", "Of"]);

    let lexer = Lexer::new(vec![
        TokenDef::keyword("Colon", ":"),
        TokenDef::pattern("Label", "[a-z]+").only_after(&["Colon"]),
        TokenDef::pattern("Word", "[a-z]+"),
    ])
    .unwrap();
    let got: Vec<_> = lexer
        .tokenize("a:b")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(got, ["Word", "Colon", "Label"]);
}

// === Positions ===

#[test]
fn positions_and_line_breaks() {
    let tokens = js().tokenize("a\n  b").unwrap();
    assert_eq!(tokens[1].start(), Position::new(4, 2, 2));
    assert!(tokens[1].has_line_break_before);
    assert!(!tokens[0].has_line_break_before);

    let tokens = js().tokenize("a\r\nb").unwrap();
    assert_eq!(tokens[1].start(), Position::new(3, 2, 0));

    let tokens = js().tokenize("a // c\u{2028}b").unwrap();
    assert_eq!(tokens.len(), 2);
    assert!(tokens[1].has_line_break_before);
    assert_eq!(tokens[1].start().line, 2);
}

#[test]
fn end_of_input_is_none() {
    let lexer = js();
    let src = "a   ";
    let start = Position::START.advance("a");
    assert_eq!(
        lexer
            .read_token_at(src, start, LexicalGoal::Div, Some("Identifier"), 0)
            .unwrap(),
        None
    );
    assert!(lexer.tokenize("").unwrap().is_empty());
}

#[test]
fn unexpected_character() {
    let err = js().tokenize("a # b").unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedCharacter {
            ch: '#',
            position: Position::new(2, 1, 2)
        }
    );
}

// === Definitions ===

#[test]
fn build_errors() {
    assert!(matches!(
        Lexer::new(vec![TokenDef::pattern("Bad", "(")]),
        Err(LexerBuildError::InvalidPattern { name: "Bad", .. })
    ));
    assert!(matches!(
        Lexer::new(vec![TokenDef::keyword("Empty", "")]),
        Err(LexerBuildError::EmptyKeyword { name: "Empty" })
    ));
    assert!(matches!(
        Lexer::new(vec![TokenDef::keyword("", "x")]),
        Err(LexerBuildError::EmptyName)
    ));
}

#[test]
fn keyword_queries() {
    let lexer = js();
    assert_eq!(lexer.keyword_text("Let"), Some("let"));
    assert_eq!(lexer.keyword_text("Identifier"), None);
    assert!(lexer.is_reserved_word("Return"));
    assert!(!lexer.is_reserved_word("Slash"));
    assert!(lexer.has_token("WhiteSpace"));
    assert!(!lexer.token_names().any(|n| n == "WhiteSpace"));
}

proptest! {
    #[test]
    fn token_values_match_their_spans(src in "[a-z ;\n]{0,48}") {
        let tokens = js().tokenize(&src).unwrap();
        let mut last_end = 0;
        for token in &tokens {
            prop_assert_eq!(&src[token.span.range()], token.value.as_str());
            prop_assert!(token.index() >= last_end);
            last_end = token.end_index();
        }
    }

    #[test]
    fn tokenize_is_deterministic(src in "[a-z0-9 /=+;]{0,32}") {
        let lexer = js();
        prop_assert_eq!(lexer.tokenize(&src), lexer.tokenize(&src));
    }
}
