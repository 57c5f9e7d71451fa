use super::*;

fn sample() -> Token {
    let start = Position::new(4, 1, 4);
    let end = start.advance("foo");
    Token::new("Identifier", "foo", Span::new(start, end))
}

#[test]
fn accessors_follow_span() {
    let tok = sample();
    assert_eq!(tok.index(), 4);
    assert_eq!(tok.end_index(), 7);
    assert_eq!(tok.start().column, 4);
    assert_eq!(tok.end().column, 7);
    assert!(tok.is("Identifier"));
    assert!(!tok.is("Keyword"));
}

#[test]
fn line_break_flag_defaults_off() {
    let tok = sample();
    assert!(!tok.has_line_break_before);
    assert!(tok.with_line_break_before(true).has_line_break_before);
}

#[test]
fn display_shows_name_value_and_position() {
    assert_eq!(sample().to_string(), "Identifier(\"foo\") at 1:5");
}
