use super::*;

#[test]
fn phases_follow_first_digit() {
    assert!(ErrorCode::E0001.is_lexer_error());
    assert!(ErrorCode::E1004.is_parser_error());
    assert!(ErrorCode::E2003.is_grammar_error());
    assert!(ErrorCode::E9001.is_internal());
    assert!(!ErrorCode::E9001.is_parser_error());
}

#[test]
fn display_matches_as_str() {
    assert_eq!(ErrorCode::E2002.to_string(), "E2002");
    assert_eq!(ErrorCode::E1002.as_str(), "E1002");
}

#[test]
fn every_code_has_a_description() {
    let codes = [
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];
    for code in codes {
        assert!(!code.description().is_empty(), "{code} has no description");
    }
}
