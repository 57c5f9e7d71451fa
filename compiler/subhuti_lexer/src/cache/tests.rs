use super::*;
use crate::TokenDef;

fn lexer() -> Lexer {
    Lexer::new(vec![
        TokenDef::pattern("WhiteSpace", r"[ \t]+").skip(),
        TokenDef::pattern("Identifier", r"[a-z]+"),
        TokenDef::keyword("Slash", "/"),
    ])
    .unwrap()
}

#[test]
fn repeated_reads_hit() {
    let lexer = lexer();
    let mut cache = LexCache::new();
    let src = "a / b";

    let first = cache
        .read_token_at(&lexer, src, Position::START, LexicalGoal::Div, None, 0)
        .unwrap();
    let second = cache
        .read_token_at(&lexer, src, Position::START, LexicalGoal::Div, None, 0)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.stats(), LexCacheStats { hits: 1, misses: 1 });
    assert_eq!(cache.len(), 1);
}

#[test]
fn goal_and_context_are_part_of_the_key() {
    let lexer = lexer();
    let mut cache = LexCache::new();
    let src = "a / b";

    for goal in [LexicalGoal::Div, LexicalGoal::RegExp] {
        cache
            .read_token_at(&lexer, src, Position::START, goal, None, 0)
            .unwrap();
    }
    cache
        .read_token_at(&lexer, src, Position::START, LexicalGoal::Div, Some("Slash"), 0)
        .unwrap();
    cache
        .read_token_at(&lexer, src, Position::START, LexicalGoal::Div, None, 1)
        .unwrap();

    assert_eq!(cache.stats().misses, 4);
    assert_eq!(cache.stats().hits, 0);
}

#[test]
fn errors_are_cached_too() {
    let lexer = lexer();
    let mut cache = LexCache::new();
    let src = "#";

    for _ in 0..2 {
        let err = cache
            .read_token_at(&lexer, src, Position::START, LexicalGoal::Div, None, 0)
            .unwrap_err();
        assert_eq!(err.position(), Position::START);
    }
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn clear_resets() {
    let lexer = lexer();
    let mut cache = LexCache::new();
    cache
        .read_token_at(&lexer, "a", Position::START, LexicalGoal::Div, None, 0)
        .unwrap();
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats(), LexCacheStats::default());
}
